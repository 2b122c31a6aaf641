use crate::error::{NewsreelError, NewsreelResult};

/// Cross-image transition, mapped 1:1 onto ffmpeg `xfade` transition names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Fade,
    SlideRight,
    CircleOpen,
    FadeBlack,
}

impl TransitionKind {
    pub fn xfade_name(self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::SlideRight => "slideright",
            TransitionKind::CircleOpen => "circleopen",
            TransitionKind::FadeBlack => "fadeblack",
        }
    }
}

pub fn parse_transition(name: &str) -> NewsreelResult<TransitionKind> {
    let kind = name.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(NewsreelError::validation("transition kind must be non-empty"));
    }

    match kind.as_str() {
        "fade" | "crossfade" => Ok(TransitionKind::Fade),
        "slideright" | "slide_right" | "slide-right" => Ok(TransitionKind::SlideRight),
        "circleopen" | "circle_open" | "circle-open" | "circle" => Ok(TransitionKind::CircleOpen),
        "fadeblack" | "fade_black" | "fade-black" | "black" => Ok(TransitionKind::FadeBlack),
        _ => Err(NewsreelError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!(parse_transition("circle_open").unwrap(), TransitionKind::CircleOpen);
        assert_eq!(parse_transition(" Fade ").unwrap(), TransitionKind::Fade);
        assert_eq!(parse_transition("slide-right").unwrap(), TransitionKind::SlideRight);
        assert_eq!(parse_transition("black").unwrap(), TransitionKind::FadeBlack);
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!(parse_transition("").is_err());
        assert!(parse_transition("spin").is_err());
    }

    #[test]
    fn xfade_names_match_ffmpeg_vocabulary() {
        assert_eq!(TransitionKind::CircleOpen.xfade_name(), "circleopen");
        assert_eq!(TransitionKind::FadeBlack.xfade_name(), "fadeblack");
    }
}
