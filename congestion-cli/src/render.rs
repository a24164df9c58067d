use congestion_core::{CongestionLevel, CongestionRecord};

const BAR_UNIT: &str = "■■";

/// Human-readable table for a congestion record.
pub fn record_table(record: &CongestionRecord) -> String {
    let mut out = String::new();

    row(&mut out, "Area", &record.area_name);
    row(&mut out, "Measured at", &record.population_time);
    row(&mut out, "Congestion", &record.area_congest_level);
    row(&mut out, "Message", &record.area_congest_msg);
    row(&mut out, "Road traffic", record.road_congest_idx.as_deref().unwrap_or("-"));
    row(&mut out, "Road message", record.road_congest_msg.as_deref().unwrap_or("-"));

    let coordinates = record.coordinates();
    if coordinates.is_known() {
        row(
            &mut out,
            "Coordinates",
            &format!("{:.4}, {:.4}", coordinates.latitude, coordinates.longitude),
        );
    } else {
        row(&mut out, "Coordinates", "unknown");
    }

    if record.forecast_times.is_empty() {
        return out;
    }

    out.push_str("\nForecast\n");
    for (time, level) in record.forecast() {
        out.push_str(&format!("  {time}  {:<8} {level}\n", level_bar(level)));
    }
    out.push_str(&format!("\nScale: {}\n", scale_legend()));

    out
}

/// One bar unit per rank, so the chart reads from 여유 (1) to 붐빔 (4).
pub fn level_bar(level: &str) -> String {
    match CongestionLevel::parse(level) {
        Some(level) => BAR_UNIT.repeat(level.rank() as usize),
        None => "?".to_string(),
    }
}

/// Known levels from least to most crowded, each with its bar.
pub fn scale_legend() -> String {
    CongestionLevel::all()
        .iter()
        .map(|level| format!("{} {level}", level_bar(level.as_str())))
        .collect::<Vec<_>>()
        .join(" < ")
}

fn row(out: &mut String, label: &str, value: &str) {
    let value = if value.is_empty() { "-" } else { value };
    out.push_str(&format!("{label:<14}{value}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use congestion_core::Coordinates;

    fn sample() -> CongestionRecord {
        let mut record = CongestionRecord::new("강남역");
        record.population_time = "2024-01-01 08:55".into();
        record.area_congest_level = "보통".into();
        record.forecast_times = vec!["09:00:00".into(), "10:00:00".into()];
        record.forecast_congestions = vec!["여유".into(), "붐빔".into()];
        record.with_coordinates(Coordinates::new(37.4981, 127.0276))
    }

    #[test]
    fn table_lists_fields_and_forecast() {
        let table = record_table(&sample());

        assert!(table.contains("Area          강남역"));
        assert!(table.contains("Road traffic  -"));
        assert!(table.contains("37.4981, 127.0276"));
        assert!(table.contains("Forecast"));
        assert!(table.contains("Scale: ■■ 여유 < ■■■■ 보통"));

        let forecast: Vec<&str> = table.lines().filter(|l| l.starts_with("  ")).collect();
        assert_eq!(forecast.len(), 2);
        assert!(forecast[0].contains("09:00:00") && forecast[0].ends_with("여유"));
        assert!(forecast[1].contains("10:00:00") && forecast[1].ends_with("붐빔"));
    }

    #[test]
    fn unknown_coordinates_and_empty_forecast() {
        let table = record_table(&CongestionRecord::new("임시 행사장"));

        assert!(table.contains("Coordinates   unknown"));
        assert!(!table.contains("Forecast"));
        assert!(!table.contains("Scale:"));
    }

    #[test]
    fn bar_grows_with_level() {
        assert_eq!(level_bar("여유"), BAR_UNIT);
        assert_eq!(level_bar("붐빔"), BAR_UNIT.repeat(4));
        assert_eq!(level_bar("알 수 없음"), "?");
    }

    #[test]
    fn legend_lists_levels_in_order() {
        assert_eq!(
            scale_legend(),
            "■■ 여유 < ■■■■ 보통 < ■■■■■■ 약간 붐빔 < ■■■■■■■■ 붐빔"
        );
    }
}
