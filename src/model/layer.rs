use std::fmt;

use serde::{Deserialize, Serialize};

// Board layer identifiers. Copper layers are ordered top, inner 1..N,
// bottom; inner indices are 1-based and only meaningful up to the board's
// inner layer count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    BoardOutline,
    TopPlacement,
    BottomPlacement,
    TopDocumentation,
    BottomDocumentation,
    TopCourtyard,
    BottomCourtyard,
    TopLegend,
    BottomLegend,
    TopStopMask,
    BottomStopMask,
    TopSolderPaste,
    BottomSolderPaste,
    TopCopper,
    InnerCopper(u8),
    BottomCopper,
}

impl Layer {
    pub fn inner_copper(i: u8) -> Self {
        assert!(i > 0, "inner copper layers are 1-based");
        Self::InnerCopper(i)
    }

    pub const fn is_copper(self) -> bool {
        matches!(self, Self::TopCopper | Self::InnerCopper(_) | Self::BottomCopper)
    }

    pub const fn is_inner_copper(self) -> bool {
        matches!(self, Self::InnerCopper(_))
    }

    pub const fn inner_copper_index(self) -> Option<u8> {
        match self {
            Self::InnerCopper(i) => Some(i),
            _ => None,
        }
    }

    pub const fn is_stop_mask(self) -> bool {
        matches!(self, Self::TopStopMask | Self::BottomStopMask)
    }

    pub const fn is_courtyard(self) -> bool {
        matches!(self, Self::TopCourtyard | Self::BottomCourtyard)
    }

    // Top and bottom swap under mirroring; the board outline and inner
    // copper layers map to themselves.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::TopPlacement => Self::BottomPlacement,
            Self::BottomPlacement => Self::TopPlacement,
            Self::TopDocumentation => Self::BottomDocumentation,
            Self::BottomDocumentation => Self::TopDocumentation,
            Self::TopCourtyard => Self::BottomCourtyard,
            Self::BottomCourtyard => Self::TopCourtyard,
            Self::TopLegend => Self::BottomLegend,
            Self::BottomLegend => Self::TopLegend,
            Self::TopStopMask => Self::BottomStopMask,
            Self::BottomStopMask => Self::TopStopMask,
            Self::TopSolderPaste => Self::BottomSolderPaste,
            Self::BottomSolderPaste => Self::TopSolderPaste,
            Self::TopCopper => Self::BottomCopper,
            Self::BottomCopper => Self::TopCopper,
            l => l,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardOutline => write!(f, "brd_outlines"),
            Self::TopPlacement => write!(f, "top_placement"),
            Self::BottomPlacement => write!(f, "bot_placement"),
            Self::TopDocumentation => write!(f, "top_documentation"),
            Self::BottomDocumentation => write!(f, "bot_documentation"),
            Self::TopCourtyard => write!(f, "top_courtyard"),
            Self::BottomCourtyard => write!(f, "bot_courtyard"),
            Self::TopLegend => write!(f, "top_legend"),
            Self::BottomLegend => write!(f, "bot_legend"),
            Self::TopStopMask => write!(f, "top_stop_mask"),
            Self::BottomStopMask => write!(f, "bot_stop_mask"),
            Self::TopSolderPaste => write!(f, "top_solder_paste"),
            Self::BottomSolderPaste => write!(f, "bot_solder_paste"),
            Self::TopCopper => write!(f, "top_cu"),
            Self::InnerCopper(i) => write!(f, "in{i}_cu"),
            Self::BottomCopper => write!(f, "bot_cu"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(Layer::TopCopper.is_copper());
        assert!(Layer::inner_copper(3).is_copper());
        assert!(Layer::inner_copper(3).is_inner_copper());
        assert_eq!(Layer::inner_copper(3).inner_copper_index(), Some(3));
        assert!(!Layer::TopStopMask.is_copper());
        assert!(Layer::BottomStopMask.is_stop_mask());
    }

    #[test]
    fn test_mirrored() {
        assert_eq!(Layer::TopCopper.mirrored(), Layer::BottomCopper);
        assert_eq!(Layer::BottomLegend.mirrored(), Layer::TopLegend);
        assert_eq!(Layer::BoardOutline.mirrored(), Layer::BoardOutline);
        assert_eq!(Layer::inner_copper(2).mirrored(), Layer::inner_copper(2));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Layer::TopCopper.to_string(), "top_cu");
        assert_eq!(Layer::inner_copper(1).to_string(), "in1_cu");
        assert_eq!(Layer::BoardOutline.to_string(), "brd_outlines");
    }
}
