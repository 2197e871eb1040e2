//! Station grouping and classification

use std::collections::BTreeMap;

use super::row::Row;

/// How a station's segments are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationKind {
    /// Timed cure hold; a single start/end timestamp segment
    CureBuffer,
    /// End-of-line functional test; a single fixed tester segment
    EndOfLine,
    /// Every step group becomes a segment
    Standard,
}

impl StationKind {
    /// Classify from the station title. Cure buffers win over tests.
    pub fn classify(title: &str) -> Self {
        let lowered = title.to_lowercase();
        if lowered.contains("cure buffer") {
            StationKind::CureBuffer
        } else if lowered.contains("test") || lowered.contains("eol") {
            StationKind::EndOfLine
        } else {
            StationKind::Standard
        }
    }
}

/// All rows sharing a station number
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub number: u32,
    pub title: String,
    pub kind: StationKind,
    pub rows: Vec<Row>,
}

/// Rows of one station sharing a step label, in sheet order
#[derive(Debug, Clone, PartialEq)]
pub struct StepGroup<'a> {
    pub step: &'a str,
    pub rows: Vec<&'a Row>,
}

impl<'a> StepGroup<'a> {
    /// The row that drives titles, work instructions, fixtures and samples
    pub fn first(&self) -> &'a Row {
        self.rows[0]
    }
}

impl Station {
    pub fn new(number: u32, rows: Vec<Row>) -> Self {
        let title_rows: Vec<&Row> = rows.iter().filter(|r| r.is_title_row()).collect();
        if title_rows.len() > 1 {
            tracing::debug!(
                "Station {number:03} has {} title rows, using the first",
                title_rows.len()
            );
        }

        let title = title_rows
            .first()
            .map(|r| r.title())
            .filter(|t| !t.is_empty())
            .map_or_else(|| format!("Station {number:03}"), ToString::to_string);

        Self {
            number,
            kind: StationKind::classify(&title),
            title,
            rows,
        }
    }

    pub fn workstation_name(&self) -> String {
        format!("S{:03}", self.number)
    }

    /// Non-title rows grouped by step, groups in order of first appearance
    pub fn step_groups(&self) -> Vec<StepGroup<'_>> {
        let mut groups: Vec<StepGroup<'_>> = Vec::new();
        for row in self.rows.iter().filter(|r| !r.is_title_row()) {
            match groups.iter_mut().find(|g| g.step == row.step) {
                Some(group) => group.rows.push(row),
                None => groups.push(StepGroup {
                    step: &row.step,
                    rows: vec![row],
                }),
            }
        }
        groups
    }
}

/// Partition normalized rows by station, ordered by station number
pub fn group_stations(rows: Vec<Row>) -> Vec<Station> {
    let mut by_station: BTreeMap<u32, Vec<Row>> = BTreeMap::new();
    for row in rows {
        by_station.entry(row.station).or_default().push(row);
    }

    by_station
        .into_iter()
        .map(|(number, rows)| Station::new(number, rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn row(station: u32, step: &str, title: &str) -> Row {
        let mut cells = HashMap::new();
        cells.insert("Title".to_string(), title.to_string());
        Row::new(station, step, cells)
    }

    #[rstest]
    #[case("Glue Cure Buffer", StationKind::CureBuffer)]
    #[case("CURE BUFFER test", StationKind::CureBuffer)]
    #[case("Station 1 Test", StationKind::EndOfLine)]
    #[case("EOL Functional", StationKind::EndOfLine)]
    #[case("Hand Attestation", StationKind::EndOfLine)]
    #[case("Cure oven", StationKind::Standard)]
    #[case("Frame assembly", StationKind::Standard)]
    fn test_classification(#[case] title: &str, #[case] expected: StationKind) {
        assert_eq!(StationKind::classify(title), expected);
    }

    #[test]
    fn test_groups_by_station_in_ascending_order() {
        let stations = group_stations(vec![
            row(20, "000", "Second"),
            row(5, "000", "First"),
            row(20, "010", "Step"),
        ]);

        let numbers: Vec<u32> = stations.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![5, 20]);
        assert_eq!(stations[1].rows.len(), 2);
        assert_eq!(stations[1].workstation_name(), "S020");
    }

    #[test]
    fn test_title_falls_back_to_station_number() {
        let station = Station::new(7, vec![row(7, "010", "Place part")]);
        assert_eq!(station.title, "Station 007");
        assert_eq!(station.kind, StationKind::Standard);
    }

    #[test]
    fn test_first_title_row_wins() {
        let station = Station::new(
            1,
            vec![row(1, "000", "Frame"), row(1, "000", "Ignored")],
        );
        assert_eq!(station.title, "Frame");
    }

    #[test]
    fn test_step_groups_merge_repeated_steps() {
        let station = Station::new(
            1,
            vec![
                row(1, "000", "Frame"),
                row(1, "020", "Fasten"),
                row(1, "010", "Place"),
                row(1, "020", "Fasten second"),
            ],
        );

        let groups = station.step_groups();
        let summary: Vec<(&str, usize)> = groups.iter().map(|g| (g.step, g.rows.len())).collect();
        assert_eq!(summary, vec![("020", 2), ("010", 1)]);
        assert_eq!(groups[0].first().title(), "Fasten");
    }
}
