use crate::error::{NewsreelError, NewsreelResult};
use crate::model::ImageSlot;

/// Effect family, used in configuration to describe the assignment cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Zoom,
    Pan,
    Static,
    Fade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    LeftToRight,
    RightToLeft,
}

/// Fully resolved effect parameters for one slot. Motion parameters are
/// interpreted linearly over the slot's duration, so the motion completes
/// exactly at slot end.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDescriptor {
    Zoom { start_scale: f64, end_scale: f64 },
    Pan { direction: PanDirection, distance_frac: f64 },
    Static,
    Fade { fade_in_secs: f64, fade_out_secs: f64 },
}

impl EffectDescriptor {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectDescriptor::Zoom { .. } => EffectKind::Zoom,
            EffectDescriptor::Pan { .. } => EffectKind::Pan,
            EffectDescriptor::Static => EffectKind::Static,
            EffectDescriptor::Fade { .. } => EffectKind::Fade,
        }
    }
}

const ZOOM_START_SCALE: f64 = 1.0;
const ZOOM_END_SCALE: f64 = 1.15;
const PAN_DISTANCE_FRAC: f64 = 0.08;
const FADE_FRACTION: f64 = 0.2;
const FADE_MAX_SECS: f64 = 0.75;

/// Assigns one deterministic [`EffectDescriptor`] per slot by cycling
/// through the configured kinds (default zoom/pan alternation). A pure
/// function of `(index, duration, cycle)`; slots can be planned in any
/// order or independently.
#[derive(Clone, Debug)]
pub struct EffectPlanner {
    cycle: Vec<EffectKind>,
}

impl EffectPlanner {
    pub fn new(cycle: Vec<EffectKind>) -> NewsreelResult<Self> {
        if cycle.is_empty() {
            return Err(NewsreelError::validation("effect cycle must be non-empty"));
        }
        Ok(Self { cycle })
    }

    pub fn plan(&self, slots: &[ImageSlot]) -> Vec<EffectDescriptor> {
        slots
            .iter()
            .map(|slot| self.descriptor_for(slot.index, slot.duration_secs))
            .collect()
    }

    fn descriptor_for(&self, index: usize, duration_secs: f64) -> EffectDescriptor {
        match self.cycle[index % self.cycle.len()] {
            EffectKind::Zoom => EffectDescriptor::Zoom {
                start_scale: ZOOM_START_SCALE,
                end_scale: ZOOM_END_SCALE,
            },
            EffectKind::Pan => {
                // Direction flips on every full pass through the cycle.
                let direction = if (index / self.cycle.len()) % 2 == 0 {
                    PanDirection::LeftToRight
                } else {
                    PanDirection::RightToLeft
                };
                EffectDescriptor::Pan {
                    direction,
                    distance_frac: PAN_DISTANCE_FRAC,
                }
            }
            EffectKind::Static => EffectDescriptor::Static,
            EffectKind::Fade => {
                let fade = (duration_secs * FADE_FRACTION).min(FADE_MAX_SECS);
                EffectDescriptor::Fade {
                    fade_in_secs: fade,
                    fade_out_secs: fade,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRef;
    use std::path::PathBuf;

    fn slots(durations: &[f64]) -> Vec<ImageSlot> {
        let mut start = 0.0;
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let slot = ImageSlot {
                    image: ImageRef {
                        path: PathBuf::from(format!("imagen{i}.jpg")),
                        index: i,
                    },
                    start_secs: start,
                    duration_secs: *d,
                    index: i,
                };
                start += d;
                slot
            })
            .collect()
    }

    #[test]
    fn default_cycle_alternates_zoom_and_pan() {
        let planner = EffectPlanner::new(vec![EffectKind::Zoom, EffectKind::Pan]).unwrap();
        let effects = planner.plan(&slots(&[2.0, 2.0, 2.0, 2.0]));
        assert_eq!(effects[0].kind(), EffectKind::Zoom);
        assert_eq!(effects[1].kind(), EffectKind::Pan);
        assert_eq!(effects[2].kind(), EffectKind::Zoom);
        assert_eq!(effects[3].kind(), EffectKind::Pan);
    }

    #[test]
    fn pan_direction_flips_each_cycle_pass() {
        let planner = EffectPlanner::new(vec![EffectKind::Zoom, EffectKind::Pan]).unwrap();
        let effects = planner.plan(&slots(&[2.0; 8]));
        let dirs: Vec<PanDirection> = effects
            .iter()
            .filter_map(|e| match e {
                EffectDescriptor::Pan { direction, .. } => Some(*direction),
                _ => None,
            })
            .collect();
        assert_eq!(
            dirs,
            vec![
                PanDirection::LeftToRight,
                PanDirection::RightToLeft,
                PanDirection::LeftToRight,
                PanDirection::RightToLeft,
            ]
        );
    }

    #[test]
    fn planning_is_idempotent() {
        let planner = EffectPlanner::new(vec![EffectKind::Zoom, EffectKind::Pan]).unwrap();
        let s = slots(&[1.5, 2.5, 3.5]);
        assert_eq!(planner.plan(&s), planner.plan(&s));
    }

    #[test]
    fn descriptors_depend_only_on_index_and_duration() {
        let planner = EffectPlanner::new(vec![EffectKind::Fade]).unwrap();
        let forward = planner.plan(&slots(&[1.0, 2.0, 3.0]));
        let mut reversed_slots = slots(&[1.0, 2.0, 3.0]);
        reversed_slots.reverse();
        let mut reversed = planner.plan(&reversed_slots);
        reversed.reverse();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn fade_scales_with_duration_and_is_capped() {
        let planner = EffectPlanner::new(vec![EffectKind::Fade]).unwrap();
        let effects = planner.plan(&slots(&[1.0, 10.0]));
        match (&effects[0], &effects[1]) {
            (
                EffectDescriptor::Fade { fade_in_secs: short, .. },
                EffectDescriptor::Fade { fade_in_secs: long, .. },
            ) => {
                assert!((short - 0.2).abs() < 1e-9);
                assert!((long - 0.75).abs() < 1e-9);
            }
            other => panic!("expected fades, got {other:?}"),
        }
    }

    #[test]
    fn empty_cycle_is_rejected() {
        assert!(EffectPlanner::new(vec![]).is_err());
    }
}
