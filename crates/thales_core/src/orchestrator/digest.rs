//! Console digests of per-video reports and the batch summary.

use crate::report::{BatchSummary, PerPairReport};

/// Time ranges listed per entity before the remainder is collapsed.
pub const MAX_LISTED_RANGES: usize = 3;

/// Lines describing one report, starting with `Summary for <video>:`.
pub fn report_digest(video_name: &str, report: &PerPairReport) -> Vec<String> {
    let mut lines = vec![format!("Summary for {}:", video_name)];

    for (entity, data) in &report.entities {
        let stats = &data.statistics;
        lines.push(format!("  {}:", entity));
        lines.push(format!(
            "    Present in {}/{} frames ({:.1}%)",
            stats.frames_with_entity, stats.total_frames_analyzed, stats.presence_percentage
        ));

        if data.time_ranges.is_empty() {
            continue;
        }
        lines.push(format!("    Time ranges: {}", data.time_ranges.len()));
        for range in data.time_ranges.iter().take(MAX_LISTED_RANGES) {
            lines.push(format!(
                "      - {} to {} ({}s)",
                range.start, range.end, range.duration_seconds
            ));
        }
        if data.time_ranges.len() > MAX_LISTED_RANGES {
            lines.push(format!(
                "      ... and {} more",
                data.time_ranges.len() - MAX_LISTED_RANGES
            ));
        }
    }

    lines
}

/// Lines describing the batch summary.
pub fn summary_digest(summary: &BatchSummary) -> Vec<String> {
    vec![
        "Summary:".to_string(),
        format!("  Processed {} video(s)", summary.total_videos),
        format!(
            "  Found {} unique entity type(s)",
            summary.unique_entity_count
        ),
        format!("  All entities: {}", summary.all_entities.join(", ")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionOutcome, FrameDetection};
    use std::path::Path;

    fn frame(t: f64, entities: &[&str]) -> FrameDetection {
        FrameDetection::new(t, entities.iter().map(|e| e.to_string()).collect())
    }

    #[test]
    fn digest_lists_statistics_and_ranges() {
        let outcome = DetectionOutcome::new(
            5,
            vec!["tank".to_string()],
            vec![frame(0.0, &["tank"]), frame(5.0, &["tank"]), frame(10.0, &[])],
        );
        let report = PerPairReport::from_outcome(Path::new("video_1.mp4"), &outcome);

        let lines = report_digest("video_1.mp4", &report);
        assert_eq!(
            lines,
            vec![
                "Summary for video_1.mp4:",
                "  tank:",
                "    Present in 2/3 frames (66.7%)",
                "    Time ranges: 1",
                "      - 00:00:00 to 00:00:10 (10s)",
            ]
        );
    }

    #[test]
    fn digest_collapses_extra_ranges() {
        // Alternating frames give five separate runs.
        let frames: Vec<FrameDetection> = (0..10)
            .map(|i| {
                let entities: &[&str] = if i % 2 == 0 { &["jeep"] } else { &[] };
                frame(f64::from(i) * 5.0, entities)
            })
            .collect();
        let outcome = DetectionOutcome::new(5, Vec::new(), frames);
        let report = PerPairReport::from_outcome(Path::new("video_2.mkv"), &outcome);

        let lines = report_digest("video_2.mkv", &report);
        assert!(lines.contains(&"    Time ranges: 5".to_string()));
        assert_eq!(lines.iter().filter(|l| l.starts_with("      - ")).count(), 3);
        assert_eq!(lines.last().unwrap(), "      ... and 2 more");
    }

    #[test]
    fn absent_entity_has_no_range_lines() {
        let outcome = DetectionOutcome::new(5, vec!["drone".to_string()], vec![frame(0.0, &[])]);
        let report = PerPairReport::from_outcome(Path::new("video_3.avi"), &outcome);

        let lines = report_digest("video_3.avi", &report);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "    Present in 0/1 frames (0.0%)");
    }

    #[test]
    fn summary_lines() {
        let outcome = DetectionOutcome::new(
            5,
            vec!["tank".to_string(), "artillery".to_string()],
            vec![frame(0.0, &["tank"])],
        );
        let report = PerPairReport::from_outcome(Path::new("video_1.mp4"), &outcome);
        let summary = BatchSummary::from_reports(&[report]);

        assert_eq!(
            summary_digest(&summary),
            vec![
                "Summary:",
                "  Processed 1 video(s)",
                "  Found 2 unique entity type(s)",
                "  All entities: artillery, tank",
            ]
        );
    }
}
