//! Pure panel view models.
//!
//! Every panel is a function of (snapshot, selected tab). The terminal UI
//! only lays these out; all labeling and thresholding happens here.

use crate::models::{Dashboard, Region, Signal};
use crate::state::TabId;
use crate::utils::{fmt_utc, format_number};

/// Scores at or above this are risk-off
pub const RISK_OFF_THRESHOLD: f64 = 65.0;

/// Scores at or below this are risk-on
pub const RISK_ON_THRESHOLD: f64 = 35.0;

/// Shown for values that are not available yet
pub const PLACEHOLDER: &str = "—";

pub const GEO_DESCRIPTION: &str = "This tab is driven by GPR/EPU + conflict intensity (ACLED) \
aggregates generated during the daily refresh.";

pub const OVERVIEW_FOOTER: &str = "Data is refreshed by a daily batch job and served as a static \
snapshot. For fully real-time, breadth-of-market pricing you'd add a licensed feed.";

pub fn risk_label(score: f64) -> &'static str {
    if score >= RISK_OFF_THRESHOLD {
        "Risk-off"
    } else if score <= RISK_ON_THRESHOLD {
        "Risk-on"
    } else {
        "Neutral"
    }
}

/// Header pill color, independent of the label text.
pub fn header_signal(score: f64) -> Signal {
    if score >= RISK_OFF_THRESHOLD {
        Signal::Red
    } else if score <= RISK_ON_THRESHOLD {
        Signal::Green
    } else {
        Signal::Neutral
    }
}

/// Gauge fill in percent: the score clamped to [0, 100].
pub fn gauge_width(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pill {
    pub signal: Signal,
    pub text: String,
}

impl Pill {
    pub fn new(signal: Signal, text: impl Into<String>) -> Self {
        Self {
            signal,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub last_updated: String,
    pub risk: Option<Pill>,
}

pub fn header(snapshot: Option<&Dashboard>) -> HeaderView {
    match snapshot {
        Some(s) => HeaderView {
            last_updated: fmt_utc(&s.last_updated_utc),
            risk: Some(Pill::new(
                header_signal(s.risk_state.score),
                format!(
                    "{} • {}",
                    s.risk_state.display_label(),
                    s.risk_state.display_score()
                ),
            )),
        },
        None => HeaderView {
            last_updated: PLACEHOLDER.to_string(),
            risk: None,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeView {
    /// Fill percentage, clamped.
    pub width: f64,
    /// Raw score text, unclamped.
    pub value: String,
}

pub fn gauge(score: f64) -> GaugeView {
    GaugeView {
        width: gauge_width(score),
        value: format_number(score),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionChip {
    pub tab: TabId,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewView {
    pub gauge: GaugeView,
    pub drivers: Vec<Pill>,
    pub gpr: Pill,
    pub epu: Pill,
    pub hotspots: Vec<Pill>,
    pub regions: Vec<RegionChip>,
}

pub fn overview(snapshot: &Dashboard) -> OverviewView {
    let risk = &snapshot.risk_state;
    OverviewView {
        gauge: gauge(risk.score),
        drivers: risk
            .drivers
            .iter()
            .map(|d| Pill::new(d.signal, format!("{}: {}", d.name, d.value)))
            .collect(),
        gpr: Pill::new(snapshot.geo.gpr.signal, snapshot.geo.gpr.value.to_string()),
        epu: Pill::new(snapshot.geo.epu.signal, snapshot.geo.epu.value.to_string()),
        hotspots: hotspot_pills(snapshot),
        regions: snapshot
            .regions
            .iter()
            .map(|r| RegionChip {
                tab: TabId::Region(r.id.clone()),
                summary: format!("{} • {}", r.verdict.cycle, r.verdict.inflation),
            })
            .collect(),
    }
}

fn hotspot_pills(snapshot: &Dashboard) -> Vec<Pill> {
    snapshot
        .geo
        .hotspots
        .iter()
        .map(|h| Pill::new(h.signal, h.name.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: String,
    pub value: String,
    pub signal: Signal,
    /// Upper-cased signal word, or an em-dash for neutral.
    pub signal_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub title: String,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionView {
    pub id: String,
    pub name: String,
    pub verdict: String,
    pub blocks: Vec<BlockView>,
}

pub fn region(region: &Region) -> RegionView {
    RegionView {
        id: region.id.clone(),
        name: region.display_name().to_string(),
        verdict: format!(
            "Cycle: {} • Inflation: {} • Financial: {}",
            region.verdict.cycle, region.verdict.inflation, region.verdict.financial
        ),
        blocks: region
            .blocks
            .iter()
            .map(|b| BlockView {
                title: b.title.clone(),
                rows: b
                    .items
                    .iter()
                    .map(|it| RowView {
                        key: it.key.clone(),
                        value: it.value.to_string(),
                        signal: it.signal,
                        signal_text: it.signal.cell_text(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoView {
    pub gpr: Pill,
    pub epu: Pill,
    pub hotspots: Vec<Pill>,
    pub description: &'static str,
}

pub fn geo(snapshot: &Dashboard) -> GeoView {
    GeoView {
        gpr: Pill::new(snapshot.geo.gpr.signal, format!("GPR: {}", snapshot.geo.gpr.value)),
        epu: Pill::new(snapshot.geo.epu.signal, format!("EPU: {}", snapshot.geo.epu.value)),
        hotspots: hotspot_pills(snapshot),
        description: GEO_DESCRIPTION,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Overview(OverviewView),
    Region(RegionView),
    Geo(GeoView),
}

/// The panel for a tab, or `None` when the tab matches nothing in the snapshot.
pub fn panel(snapshot: &Dashboard, tab: &TabId) -> Option<Panel> {
    match tab {
        TabId::Overview => Some(Panel::Overview(overview(snapshot))),
        TabId::Geo => Some(Panel::Geo(geo(snapshot))),
        TabId::Region(id) => snapshot.region(id).map(|r| Panel::Region(region(r))),
    }
}
