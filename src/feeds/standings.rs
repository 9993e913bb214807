//! Championship standings lists

use serde_json::Value;
use tracing::info;

use crate::config::{BoardConfig, StandingsKind};
use crate::extract::{ArrayLocator, RankedScanner};
use crate::source::{Transport, fetch_feed};
use crate::types::FormattedRow;
use crate::types::value::{first_int, text};
use crate::Result;

const RANK_KEYS: &[&str] = &["position", "positionText"];

/// Row for one `DriverStandings` element: position, code or family name, points, wins.
pub fn driver_standing_row(entry: &Value, arrival: usize) -> (Option<FormattedRow>, i64) {
    let rank = first_int(entry, RANK_KEYS).unwrap_or(arrival as i64);
    let name = entry.get("Driver").and_then(|driver| text(driver, "code").or_else(|| text(driver, "familyName")));
    (name.map(|name| standing_row(entry, rank, name)), rank)
}

/// Row for one `ConstructorStandings` element: position, team name, points, wins.
pub fn constructor_standing_row(entry: &Value, arrival: usize) -> (Option<FormattedRow>, i64) {
    let rank = first_int(entry, RANK_KEYS).unwrap_or(arrival as i64);
    let name = entry.get("Constructor").and_then(|team| text(team, "name"));
    (name.map(|name| standing_row(entry, rank, name)), rank)
}

fn standing_row(entry: &Value, rank: i64, name: String) -> FormattedRow {
    let points = text(entry, "points").unwrap_or_else(|| "0".to_string());
    let wins = text(entry, "wins").unwrap_or_else(|| "0".to_string());
    FormattedRow::new(format!("P{}", rank), name, format!("{} pts", points), format!("{} W", wins))
}

/// Top standings rows, best first, at most `standings_capacity` long.
pub async fn fetch_standings(
    transport: &mut dyn Transport,
    config: &BoardConfig,
    kind: StandingsKind,
) -> Result<Vec<FormattedRow>> {
    let url = config.standings_url(kind);
    let rank: fn(&Value, usize) -> (Option<FormattedRow>, i64) = match kind {
        StandingsKind::Drivers => driver_standing_row,
        StandingsKind::Constructors => constructor_standing_row,
    };
    let scanner = RankedScanner::new(
        ArrayLocator::key(kind.array_key()),
        config.standings_capacity,
        config.http_read_chunk_bytes,
        config.max_object_bytes,
        rank,
    );

    let entries = fetch_feed(transport, &url, scanner).await?;
    info!(?kind, rows = entries.len(), "Standings fetched");
    Ok(entries.into_iter().map(|entry| entry.row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryTransport;
    use crate::test_utils::{constructor_standings_document, driver_standings_document};
    use serde_json::json;

    #[test]
    fn driver_row_prefers_code() {
        let entry = json!({
            "position": "2", "points": "25", "wins": "1",
            "Driver": {"code": "NOR", "familyName": "Norris"}
        });
        let (row, rank) = driver_standing_row(&entry, 9);
        assert_eq!(rank, 2);
        assert_eq!(row, Some(FormattedRow::new("P2", "NOR", "25 pts", "1 W")));
    }

    #[test]
    fn driver_row_falls_back_to_family_name_and_arrival() {
        let entry = json!({"points": 4, "Driver": {"familyName": "Bortoleto"}});
        let (row, rank) = driver_standing_row(&entry, 5);
        assert_eq!(rank, 5);
        assert_eq!(row, Some(FormattedRow::new("P5", "Bortoleto", "4 pts", "0 W")));
    }

    #[test]
    fn nameless_entries_are_skipped() {
        let (row, rank) = constructor_standing_row(&json!({"position": "3", "Constructor": {}}), 3);
        assert!(row.is_none());
        assert_eq!(rank, 3);
    }

    #[tokio::test]
    async fn fetches_top_rows_in_rank_order() {
        let config = BoardConfig { standings_capacity: 3, ..Default::default() };
        let mut transport = MemoryTransport::new(17);
        let codes = ["VER", "NOR", "LEC", "PIA", "HAM"];
        transport.set_body(config.standings_url(StandingsKind::Drivers), driver_standings_document(&codes));

        let rows = fetch_standings(&mut transport, &config, StandingsKind::Drivers).await.unwrap();
        let names: Vec<_> = rows.iter().map(|row| row.columns()[1].as_str()).collect();
        assert_eq!(names, vec!["VER", "NOR", "LEC"]);
        assert_eq!(rows[0].columns()[0], "P1");
        assert_eq!(transport.close_count(), 1);
    }

    #[tokio::test]
    async fn constructor_table() {
        let config = BoardConfig::default();
        let mut transport = MemoryTransport::new(64);
        transport.set_body(
            config.standings_url(StandingsKind::Constructors),
            constructor_standings_document(&["McLaren", "Ferrari"]),
        );

        let rows = fetch_standings(&mut transport, &config, StandingsKind::Constructors).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].columns()[1], "Ferrari");
    }

    #[tokio::test]
    async fn empty_table_is_no_data() {
        let config = BoardConfig::default();
        let mut transport = MemoryTransport::new(64);
        transport.set_body(config.standings_url(StandingsKind::Drivers), driver_standings_document(&[]));

        let err = fetch_standings(&mut transport, &config, StandingsKind::Drivers).await.unwrap_err();
        assert!(err.is_no_data());
    }
}
