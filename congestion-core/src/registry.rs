//! Static coordinate table for the areas served by the Seoul real-time city data API.
//!
//! Names are the canonical Korean names the upstream API reports in `AREA_NM`.
//! Lookup is exact string equality; unknown names map to [`Coordinates::UNKNOWN`].

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::model::Coordinates;

const AREAS: &[(&str, f64, f64)] = &[
    // tourist zones
    ("강남 MICE 관광특구", 37.5133, 127.0592),
    ("동대문 관광특구", 37.5714, 127.0090),
    ("명동 관광특구", 37.5636, 126.9827),
    ("이태원 관광특구", 37.5345, 126.9943),
    ("잠실 관광특구", 37.5130, 127.1025),
    ("종로·청계 관광특구", 37.5705, 126.9850),
    ("홍대 관광특구", 37.5568, 126.9237),
    // palaces and heritage
    ("경복궁", 37.5796, 126.9770),
    ("광화문·덕수궁", 37.5664, 126.9779),
    ("보신각", 37.5704, 126.9824),
    ("서울 암사동 유적", 37.5513, 127.1303),
    ("창덕궁·종묘", 37.5794, 126.9910),
    // stations
    ("가산디지털단지역", 37.4816, 126.8828),
    ("강남역", 37.4981, 127.0276),
    ("건대입구역", 37.5405, 127.0701),
    ("고덕역", 37.5545, 127.1540),
    ("고속터미널역", 37.5046, 127.0046),
    ("교대역", 37.4939, 127.0148),
    ("구로디지털단지역", 37.4854, 126.9014),
    ("구로역", 37.5030, 126.8827),
    ("군자역", 37.5573, 127.0794),
    ("남구로역", 37.4863, 126.8877),
    ("대림역", 37.4933, 126.8965),
    ("동대문역", 37.5714, 127.0090),
    ("뚝섬역", 37.5475, 127.0471),
    ("미아사거리역", 37.6132, 127.0300),
    ("발산역", 37.5585, 126.8377),
    ("북한산우이역", 37.6633, 127.0122),
    ("사당역", 37.4765, 126.9816),
    ("삼각지역", 37.5345, 126.9733),
    ("서울대입구역", 37.4813, 126.9527),
    ("서울식물원·마곡나루역", 37.5639, 126.8328),
    ("서울역", 37.5547, 126.9706),
    ("선릉역", 37.5045, 127.0496),
    ("성신여대입구역", 37.5926, 127.0163),
    ("수유역", 37.6387, 127.0251),
    ("신논현역·논현역", 37.5081, 127.0250),
    ("신도림역", 37.5086, 126.8912),
    ("신림역", 37.4848, 126.9291),
    ("신촌·이대역", 37.5597, 126.9426),
    ("양재역", 37.4848, 127.0348),
    ("역삼역", 37.5009, 127.0367),
    ("연신내역", 37.6190, 126.9217),
    ("오목교역·목동운동장", 37.5245, 126.8750),
    ("왕십리역", 37.5614, 127.0370),
    ("용산역", 37.5299, 126.9646),
    ("이태원역", 37.5345, 126.9943),
    ("장지역", 37.4780, 127.1236),
    ("장한평역", 37.5613, 127.0643),
    ("천호역", 37.5386, 127.1230),
    ("총신대입구(이수)역", 37.4860, 126.9823),
    ("충정로역", 37.5604, 126.9634),
    ("합정역", 37.5494, 126.9132),
    ("혜화역", 37.5823, 127.0018),
    ("홍대입구역(2호선)", 37.5568, 126.9237),
    ("회기역", 37.5895, 127.0578),
    // neighbourhoods, streets and markets
    ("4·19 카페거리", 37.6490, 127.0137),
    ("가락시장", 37.4922, 127.1184),
    ("가로수길", 37.5219, 127.0236),
    ("광장(전통)시장", 37.5701, 126.9998),
    ("김포공항", 37.5584, 126.7940),
    ("낙산공원·이화마을", 37.5794, 127.0062),
    ("노량진", 37.5130, 126.9404),
    ("덕수궁길·정동길", 37.5651, 126.9756),
    ("방배역 먹자골목", 37.4813, 126.9964),
    ("북촌한옥마을", 37.5826, 126.9831),
    ("서촌", 37.5792, 126.9718),
    ("성수카페거리", 37.5446, 127.0555),
    ("수유리 먹자골목", 37.6341, 127.0212),
    ("쌍문동 맛집거리", 37.6484, 127.0347),
    ("압구정로데오거리", 37.5274, 127.0401),
    ("여의도", 37.5219, 126.9245),
    ("연남동", 37.5658, 126.9259),
    ("영등포 타임스퀘어", 37.5172, 126.9030),
    ("외대앞", 37.5967, 127.0634),
    ("용리단길", 37.5285, 126.9646),
    ("이태원 앤틱가구거리", 37.5342, 126.9950),
    ("인사동·익선동", 37.5748, 126.9854),
    ("창동 신경제 중심지", 37.6534, 127.0514),
    ("청담동 명품거리", 37.5242, 127.0492),
    ("청량리 제기동 일대 전통시장", 37.5801, 127.0384),
    ("해방촌·경리단길", 37.5417, 126.9876),
    // parks and venues
    ("DDP(동대문디자인플라자)", 37.5673, 127.0095),
    ("DMC(디지털미디어시티)", 37.5771, 126.8986),
    ("강서한강공원", 37.5585, 126.8377),
    ("고척돔", 37.4967, 126.8674),
    ("광나루한강공원", 37.5484, 127.1168),
    ("광화문광장", 37.5717, 126.9765),
    ("국립중앙박물관·용산가족공원", 37.5245, 126.9808),
    ("난지한강공원", 37.5674, 126.8828),
    ("남산공원", 37.5512, 126.9882),
    ("노들섬", 37.5132, 126.9534),
    ("뚝섬한강공원", 37.5313, 127.0668),
    ("망원한강공원", 37.5520, 126.8960),
    ("반포한강공원", 37.5126, 126.9957),
    ("북서울꿈의숲", 37.6204, 127.0408),
    ("불광천", 37.6100, 126.9200),
    ("서리풀공원·몽마르뜨공원", 37.4958, 127.0025),
    ("서울광장", 37.5665, 126.9780),
    ("서울대공원", 37.4360, 127.0079),
    ("서울숲공원", 37.5443, 127.0377),
    ("아차산", 37.5548, 127.1035),
    ("양화한강공원", 37.5476, 126.9134),
    ("어린이대공원", 37.5487, 127.0733),
    ("여의도한강공원", 37.5283, 126.9340),
    ("월드컵공원", 37.5692, 126.8982),
    ("응봉산", 37.5600, 127.0227),
    ("이촌한강공원", 37.5220, 126.9617),
    ("잠실종합운동장", 37.5112, 127.0717),
    ("잠실한강공원", 37.5174, 127.0813),
    ("잠원한강공원", 37.5270, 127.0112),
    ("청계산", 37.4483, 127.0586),
    ("청와대", 37.5865, 126.9748),
    // markets
    ("북창동 먹자골목", 37.5590, 126.9780),
    ("남대문시장", 37.5593, 126.9770),
];

static COORDINATES: LazyLock<HashMap<&'static str, Coordinates>> = LazyLock::new(|| {
    AREAS
        .iter()
        .map(|&(name, latitude, longitude)| (name, Coordinates::new(latitude, longitude)))
        .collect()
});

/// Coordinates for `area_name`, or `(0.0, 0.0)` if the name is not registered.
pub fn lookup(area_name: &str) -> Coordinates {
    COORDINATES.get(area_name).copied().unwrap_or(Coordinates::UNKNOWN)
}

pub fn is_known(area_name: &str) -> bool {
    COORDINATES.contains_key(area_name)
}

/// All registered names, sorted.
pub fn known_areas() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COORDINATES.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Registered names starting with `prefix`, ignoring ASCII case. An empty
/// prefix returns every name.
pub fn suggest(prefix: &str) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    known_areas()
        .into_iter()
        .filter(|name| name.to_lowercase().starts_with(&prefix))
        .collect()
}
