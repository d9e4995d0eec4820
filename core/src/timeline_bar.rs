use crate::model::TimelineSpan;

/// One proportional block on a section's visual timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBlock {
    pub name: String,
    pub years: i32,
    /// Share of the section span, in percent
    pub width_pct: f64,
    pub color: String,
    /// Entry the block navigates to
    pub target_id: String,
}

impl TimelineBlock {
    /// "Maurya (137 yrs)"
    pub fn label(&self) -> String {
        format!("{} ({} yrs)", self.name, self.years)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub start: i32,
    pub end: i32,
    pub blocks: Vec<TimelineBlock>,
}

impl TimelineBar {
    /// Blocks are sized against the span; `None` when there is nothing to
    /// draw or the span is empty.
    pub fn build(span: &TimelineSpan) -> Option<Self> {
        let total = span.end - span.start;
        if span.dynasties.is_empty() || total <= 0 {
            return None;
        }
        let blocks = span
            .dynasties
            .iter()
            .map(|d| {
                let years = d.end - d.start;
                TimelineBlock {
                    name: d.name.clone(),
                    years,
                    width_pct: f64::from(years) / f64::from(total) * 100.0,
                    color: d.color.clone(),
                    target_id: d.details_id.clone(),
                }
            })
            .collect();
        Some(TimelineBar {
            start: span.start,
            end: span.end,
            blocks,
        })
    }

    pub fn total_width_pct(&self) -> f64 {
        self.blocks.iter().map(|b| b.width_pct).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimelineRange;

    fn range(name: &str, start: i32, end: i32) -> TimelineRange {
        TimelineRange {
            name: name.to_string(),
            start,
            end,
            color: "#888".to_string(),
            details_id: name.to_lowercase(),
        }
    }

    #[test]
    fn test_widths_proportional_to_span() {
        let span = TimelineSpan {
            start: -322,
            end: -122,
            dynasties: vec![range("Maurya", -322, -185), range("Shunga", -185, -122)],
        };
        let bar = TimelineBar::build(&span).unwrap();
        assert!((bar.blocks[0].width_pct - 68.5).abs() < 1e-9);
        assert!((bar.blocks[1].width_pct - 31.5).abs() < 1e-9);
        assert!((bar.total_width_pct() - 100.0).abs() < 1e-9);
        assert_eq!(bar.blocks[0].label(), "Maurya (137 yrs)");
        assert_eq!(bar.blocks[1].target_id, "shunga");
    }

    #[test]
    fn test_empty_or_degenerate_span_has_no_bar() {
        let empty = TimelineSpan {
            start: 0,
            end: 100,
            dynasties: vec![],
        };
        assert!(TimelineBar::build(&empty).is_none());

        let inverted = TimelineSpan {
            start: 100,
            end: 100,
            dynasties: vec![range("X", 100, 100)],
        };
        assert!(TimelineBar::build(&inverted).is_none());
    }
}
