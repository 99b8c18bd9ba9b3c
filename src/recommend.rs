//! Rule table mapping posture signals to flattering clothing cuts.
//!
//! Each [`RuleKey`] has one static [`CutRule`]. A [`Trigger`] pairs a
//! predicate over [`PostureSignals`] with the rule it enables; triggers are
//! evaluated in order and every matching rule is merged into the result.
//! Signals that are absent never match, so a partial posture report yields
//! fewer recommendations rather than an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::posture::{PelvicTilt, PostureReport, PostureType, SHOULDER_SLOPE_THRESHOLD_DEG};

/// Visual references attached per garment category.
pub const MAX_VISUALS: usize = 3;

/// Fallback asset for cuts without a dedicated visual.
pub const GENERIC_VISUAL: &str = "generic_cut.png";

const VISUALS: &[(&str, &str)] = &[
    ("structured shoulders", "shoulder_pad_example.jpg"),
    ("darted backs", "darted_back_diagram.png"),
    ("high-waisted", "high_waist_visual.jpg"),
];

/// Asset for a cut name, or [`GENERIC_VISUAL`].
pub fn visual_reference(cut: &str) -> &'static str {
    VISUALS
        .iter()
        .find(|(name, _)| *name == cut)
        .map(|(_, asset)| *asset)
        .unwrap_or(GENERIC_VISUAL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    RoundedShoulders,
    UnevenShoulders,
    Kyphosis,
    ForwardHead,
    AnteriorTilt,
    PosteriorTilt,
}

/// Suggested cuts per garment category plus what to avoid and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutRule {
    pub tops: &'static [&'static str],
    pub bottoms: &'static [&'static str],
    pub dresses: &'static [&'static str],
    pub avoid: &'static [&'static str],
    pub rationale: Option<&'static str>,
}

impl CutRule {
    const EMPTY: CutRule = CutRule {
        tops: &[],
        bottoms: &[],
        dresses: &[],
        avoid: &[],
        rationale: None,
    };
}

impl RuleKey {
    pub const ALL: [RuleKey; 6] = [
        Self::RoundedShoulders,
        Self::UnevenShoulders,
        Self::Kyphosis,
        Self::ForwardHead,
        Self::AnteriorTilt,
        Self::PosteriorTilt,
    ];

    pub fn rule(self) -> &'static CutRule {
        match self {
            Self::RoundedShoulders => &ROUNDED_SHOULDERS,
            Self::UnevenShoulders => &UNEVEN_SHOULDERS,
            Self::Kyphosis => &KYPHOSIS,
            Self::ForwardHead => &FORWARD_HEAD,
            Self::AnteriorTilt => &ANTERIOR_TILT,
            Self::PosteriorTilt => &POSTERIOR_TILT,
        }
    }
}

const ROUNDED_SHOULDERS: CutRule = CutRule {
    tops: &["structured shoulders", "darted backs", "asymmetrical necklines"],
    avoid: &["slouchy sweaters", "heavy knits"],
    rationale: Some("Adds structure to correct rounded posture"),
    ..CutRule::EMPTY
};

const UNEVEN_SHOULDERS: CutRule = CutRule {
    tops: &["off-shoulder (higher side)", "one-shoulder designs", "diagonal seams"],
    avoid: &["horizontal stripes", "perfectly symmetrical cuts"],
    rationale: Some("Creates optical balance"),
    ..CutRule::EMPTY
};

const KYPHOSIS: CutRule = CutRule {
    tops: &["back interest details", "vertical seams", "wrap styles"],
    dresses: &["empire waist", "surplice neckline"],
    avoid: &["tight turtlenecks", "backless designs"],
    rationale: Some("Draws attention forward while supporting back"),
    ..CutRule::EMPTY
};

const FORWARD_HEAD: CutRule = CutRule {
    tops: &["V-necks", "scoop necks", "vertical details"],
    avoid: &["high necklines", "chokers"],
    rationale: Some("Elongates neck visually"),
    ..CutRule::EMPTY
};

const ANTERIOR_TILT: CutRule = CutRule {
    tops: &["hip-length", "tunic styles"],
    bottoms: &["high-waisted", "wide waistbands", "mid-rise"],
    avoid: &["low-rise pants", "cropped tops"],
    rationale: Some("Provides lumbar support"),
    ..CutRule::EMPTY
};

const POSTERIOR_TILT: CutRule = CutRule {
    tops: &["peplums", "ruched backs"],
    bottoms: &["contoured waistbands", "yoke details"],
    avoid: &["baggy styles", "elastic-only waists"],
    rationale: Some("Creates waist definition"),
    ..CutRule::EMPTY
};

/// The posture fields the rule table reads. Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PostureSignals {
    pub shoulder_slope_deg: Option<f32>,
    pub spinal_curvature: Option<PostureType>,
    pub pelvic_tilt: Option<PelvicTilt>,
}

impl PostureSignals {
    /// Pelvic tilt is left unset; landmarks do not yield it.
    pub fn from_report(report: &PostureReport) -> Self {
        Self {
            shoulder_slope_deg: report.shoulder_slope_deg,
            spinal_curvature: Some(report.posture_type),
            pelvic_tilt: None,
        }
    }

    pub fn with_pelvic_tilt(mut self, tilt: Option<PelvicTilt>) -> Self {
        self.pelvic_tilt = tilt;
        self
    }
}

/// A predicate paired with the rule it enables.
#[derive(Clone, Copy)]
pub struct Trigger {
    pub key: RuleKey,
    pub applies: fn(&PostureSignals) -> bool,
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger").field("key", &self.key).finish_non_exhaustive()
    }
}

fn shoulder_slope_exceeded(signals: &PostureSignals) -> bool {
    // Signed: a raised right shoulder has a negative slope and does not match.
    signals
        .shoulder_slope_deg
        .is_some_and(|slope| slope > SHOULDER_SLOPE_THRESHOLD_DEG)
}

fn kyphotic(signals: &PostureSignals) -> bool {
    signals.spinal_curvature == Some(PostureType::Kyphotic)
}

fn anterior_tilt(signals: &PostureSignals) -> bool {
    signals.pelvic_tilt == Some(PelvicTilt::Anterior)
}

/// Shoulder slope, then spine, then pelvis.
pub const DEFAULT_TRIGGERS: [Trigger; 3] = [
    Trigger {
        key: RuleKey::RoundedShoulders,
        applies: shoulder_slope_exceeded,
    },
    Trigger {
        key: RuleKey::Kyphosis,
        applies: kyphotic,
    },
    Trigger {
        key: RuleKey::AnteriorTilt,
        applies: anterior_tilt,
    },
];

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Recommendations {
    /// Rules that fired, in trigger order.
    pub applied: Vec<RuleKey>,
    pub tops: Vec<&'static str>,
    pub bottoms: Vec<&'static str>,
    pub dresses: Vec<&'static str>,
    pub avoid: Vec<&'static str>,
    /// Unique rationales joined with ". " and closed with a period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub tops_visual: Vec<&'static str>,
    pub bottoms_visual: Vec<&'static str>,
    pub dresses_visual: Vec<&'static str>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Evaluate [`DEFAULT_TRIGGERS`].
pub fn recommend(signals: &PostureSignals) -> Recommendations {
    recommend_with(signals, &DEFAULT_TRIGGERS)
}

/// Evaluate `triggers` in order and merge every matching rule.
///
/// Category lists keep first-seen order with duplicates dropped.
pub fn recommend_with(signals: &PostureSignals, triggers: &[Trigger]) -> Recommendations {
    let mut recs = Recommendations::default();
    let mut rationales: Vec<&'static str> = Vec::new();

    for trigger in triggers {
        if !(trigger.applies)(signals) || recs.applied.contains(&trigger.key) {
            continue;
        }
        let rule = trigger.key.rule();
        recs.applied.push(trigger.key);
        merge_unique(&mut recs.tops, rule.tops);
        merge_unique(&mut recs.bottoms, rule.bottoms);
        merge_unique(&mut recs.dresses, rule.dresses);
        merge_unique(&mut recs.avoid, rule.avoid);
        if let Some(reason) = rule.rationale {
            merge_unique(&mut rationales, &[reason]);
        }
    }

    if !rationales.is_empty() {
        recs.rationale = Some(format!("{}.", rationales.join(". ")));
    }
    recs.tops_visual = visuals(&recs.tops);
    recs.bottoms_visual = visuals(&recs.bottoms);
    recs.dresses_visual = visuals(&recs.dresses);

    debug!(applied = ?recs.applied, "recommendations built");
    recs
}

fn merge_unique(into: &mut Vec<&'static str>, items: &[&'static str]) {
    for item in items {
        if !into.contains(item) {
            into.push(item);
        }
    }
}

fn visuals(cuts: &[&'static str]) -> Vec<&'static str> {
    cuts.iter()
        .take(MAX_VISUALS)
        .map(|cut| visual_reference(cut))
        .collect()
}
