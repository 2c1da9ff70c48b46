//! Loss selection resolved once from configuration

use super::{CrossEntropyLoss, Criterion, FocalLoss, LdamLoss};
use crate::config::ValidationError;
use crate::data::ClassStatistics;
use std::fmt;
use std::str::FromStr;

/// Closed set of supported losses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossKind {
    #[default]
    CrossEntropy,
    Focal,
    Ldam,
}

/// Hyperparameters of the non-default losses
#[derive(Debug, Clone, PartialEq)]
pub struct LossSettings {
    pub focal_gamma: f32,
    pub ldam_max_margin: f32,
    pub ldam_scale: f32,
}

impl Default for LossSettings {
    fn default() -> Self {
        Self {
            focal_gamma: 1.0,
            ldam_max_margin: 0.5,
            ldam_scale: 30.0,
        }
    }
}

impl LossKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LossKind::CrossEntropy => "ce",
            LossKind::Focal => "focal",
            LossKind::Ldam => "ldam",
        }
    }

    /// Instantiate the criterion
    ///
    /// `weights` are optional per-class weights (cost-sensitive training).
    pub fn build(
        self,
        settings: &LossSettings,
        stats: &ClassStatistics,
        weights: Option<Vec<f32>>,
    ) -> Box<dyn Criterion> {
        match self {
            LossKind::CrossEntropy => match weights {
                Some(w) => Box::new(CrossEntropyLoss::weighted(w)),
                None => Box::new(CrossEntropyLoss::new()),
            },
            LossKind::Focal => Box::new(FocalLoss::new(settings.focal_gamma, weights)),
            LossKind::Ldam => Box::new(LdamLoss::new(
                stats,
                settings.ldam_max_margin,
                settings.ldam_scale,
                weights,
            )),
        }
    }
}

impl FromStr for LossKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ce" | "cross_entropy" => Ok(LossKind::CrossEntropy),
            "focal" => Ok(LossKind::Focal),
            "ldam" => Ok(LossKind::Ldam),
            _ => Err(ValidationError::InvalidLossType(s.to_string())),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loss_kind() {
        assert_eq!("ce".parse::<LossKind>().unwrap(), LossKind::CrossEntropy);
        assert_eq!("Focal".parse::<LossKind>().unwrap(), LossKind::Focal);
        assert_eq!("ldam".parse::<LossKind>().unwrap(), LossKind::Ldam);
        assert!(matches!(
            "hinge".parse::<LossKind>(),
            Err(ValidationError::InvalidLossType(s)) if s == "hinge"
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [LossKind::CrossEntropy, LossKind::Focal, LossKind::Ldam] {
            assert_eq!(kind.to_string().parse::<LossKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_selects_strategy() {
        let stats = ClassStatistics::new(vec![50, 5]).unwrap();
        let settings = LossSettings::default();
        assert_eq!(LossKind::CrossEntropy.build(&settings, &stats, None).name(), "CrossEntropy");
        assert_eq!(LossKind::Focal.build(&settings, &stats, None).name(), "Focal");
        assert_eq!(
            LossKind::Ldam
                .build(&settings, &stats, Some(vec![1.0, 1.0]))
                .name(),
            "LDAM"
        );
    }
}
