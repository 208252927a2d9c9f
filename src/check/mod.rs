use enumset::{enum_set, EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::check::engine::DesignRuleCheck;
use crate::check::msg::CheckMessage;
use crate::check::report::{CancelToken, NullReporter};
use crate::err::Result;
use crate::geom::units::UnsignedLength;
use crate::model::board::BoardModel;
use crate::model::graphics::SlotKind;

pub mod approval;
pub mod engine;
pub mod msg;
pub mod report;

// Most demanding drill path shape the fabrication settings allow.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum SlotAllowance {
    None,
    SingleSegmentStraight,
    MultiSegmentStraight,
    Any,
}

impl SlotAllowance {
    pub fn allows(self, kind: SlotKind) -> bool {
        match kind {
            SlotKind::RoundDrill => true,
            SlotKind::SingleSegmentStraight => self >= Self::SingleSegmentStraight,
            SlotKind::MultiSegmentStraight => self >= Self::MultiSegmentStraight,
            SlotKind::Curved => self == Self::Any,
        }
    }
}

// Rule settings, all lengths in nanometres. A zero length disables the
// corresponding check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub min_copper_width: UnsignedLength,
    pub min_copper_copper_clearance: UnsignedLength,
    pub min_copper_board_clearance: UnsignedLength,
    pub min_copper_npth_clearance: UnsignedLength,
    pub min_drill_drill_clearance: UnsignedLength,
    pub min_drill_board_clearance: UnsignedLength,
    pub min_pth_annular_ring: UnsignedLength,
    pub min_npth_drill_diameter: UnsignedLength,
    pub min_pth_drill_diameter: UnsignedLength,
    pub min_npth_slot_width: UnsignedLength,
    pub min_pth_slot_width: UnsignedLength,
    pub allowed_npth_slots: SlotAllowance,
    pub allowed_pth_slots: SlotAllowance,
    pub min_outline_tool_diameter: UnsignedLength,
}

impl Default for Settings {
    // Conservative defaults in the range fabrication houses publish.
    fn default() -> Self {
        Self {
            min_copper_width: UnsignedLength::nm(200_000),
            min_copper_copper_clearance: UnsignedLength::nm(200_000),
            min_copper_board_clearance: UnsignedLength::nm(300_000),
            min_copper_npth_clearance: UnsignedLength::nm(250_000),
            min_drill_drill_clearance: UnsignedLength::nm(350_000),
            min_drill_board_clearance: UnsignedLength::nm(500_000),
            min_pth_annular_ring: UnsignedLength::nm(200_000),
            min_npth_drill_diameter: UnsignedLength::nm(300_000),
            min_pth_drill_diameter: UnsignedLength::nm(300_000),
            min_npth_slot_width: UnsignedLength::nm(1_000_000),
            min_pth_slot_width: UnsignedLength::nm(700_000),
            allowed_npth_slots: SlotAllowance::Any,
            allowed_pth_slots: SlotAllowance::SingleSegmentStraight,
            min_outline_tool_diameter: UnsignedLength::nm(2_000_000),
        }
    }
}

impl Settings {
    // Everything off; tests enable the rules they exercise.
    pub fn disabled() -> Self {
        Self {
            min_copper_width: UnsignedLength::ZERO,
            min_copper_copper_clearance: UnsignedLength::ZERO,
            min_copper_board_clearance: UnsignedLength::ZERO,
            min_copper_npth_clearance: UnsignedLength::ZERO,
            min_drill_drill_clearance: UnsignedLength::ZERO,
            min_drill_board_clearance: UnsignedLength::ZERO,
            min_pth_annular_ring: UnsignedLength::ZERO,
            min_npth_drill_diameter: UnsignedLength::ZERO,
            min_pth_drill_diameter: UnsignedLength::ZERO,
            min_npth_slot_width: UnsignedLength::ZERO,
            min_pth_slot_width: UnsignedLength::ZERO,
            allowed_npth_slots: SlotAllowance::Any,
            allowed_pth_slots: SlotAllowance::Any,
            min_outline_tool_diameter: UnsignedLength::ZERO,
        }
    }
}

// The checks of the suite, in their fixed execution order.
#[derive(EnumSetType, Debug, Hash)]
pub enum BoardCheck {
    CopperWidth,
    CopperCopperClearance,
    CopperBoardClearance,
    CopperHoleClearance,
    DrillDrillClearance,
    DrillBoardClearance,
    AnnularRing,
    DrillDiameter,
    SlotWidth,
    AllowedSlots,
    PadConnection,
    CourtyardClearance,
    BoardOutline,
    UnplacedComponents,
    DefaultDevices,
    MissingConnections,
    StaleObjects,
}

pub const CHECK_ORDER: [BoardCheck; 17] = [
    BoardCheck::CopperWidth,
    BoardCheck::CopperCopperClearance,
    BoardCheck::CopperBoardClearance,
    BoardCheck::CopperHoleClearance,
    BoardCheck::DrillDrillClearance,
    BoardCheck::DrillBoardClearance,
    BoardCheck::AnnularRing,
    BoardCheck::DrillDiameter,
    BoardCheck::SlotWidth,
    BoardCheck::AllowedSlots,
    BoardCheck::PadConnection,
    BoardCheck::CourtyardClearance,
    BoardCheck::BoardOutline,
    BoardCheck::UnplacedComponents,
    BoardCheck::DefaultDevices,
    BoardCheck::MissingConnections,
    BoardCheck::StaleObjects,
];

// Quick runs skip everything slow; planes are not rebuilt and do not
// participate in the clearance check.
pub const QUICK_CHECKS: EnumSet<BoardCheck> = enum_set!(
    BoardCheck::CopperWidth
        | BoardCheck::CopperCopperClearance
        | BoardCheck::CopperBoardClearance
        | BoardCheck::CopperHoleClearance
);

impl BoardCheck {
    pub fn status_text(self) -> &'static str {
        match self {
            Self::CopperWidth => "Checking copper widths...",
            Self::CopperCopperClearance => "Checking copper clearances...",
            Self::CopperBoardClearance => "Checking board edge clearances...",
            Self::CopperHoleClearance => "Checking hole clearances...",
            Self::DrillDrillClearance => "Checking drill clearances...",
            Self::DrillBoardClearance => "Checking drill to board edge clearances...",
            Self::AnnularRing => "Checking annular rings...",
            Self::DrillDiameter => "Checking drill diameters...",
            Self::SlotWidth => "Checking slot widths...",
            Self::AllowedSlots => "Checking for forbidden slots...",
            Self::PadConnection => "Checking pad connections...",
            Self::CourtyardClearance => "Checking courtyard clearances...",
            Self::BoardOutline => "Checking board outline...",
            Self::UnplacedComponents => "Checking for unplaced components...",
            Self::DefaultDevices => "Checking for non-default devices...",
            Self::MissingConnections => "Checking for missing connections...",
            Self::StaleObjects => "Checking for stale objects...",
        }
    }

    // Percentage reached once this check completes; part of the fixed
    // progress schedule.
    pub fn progress_target(self) -> u8 {
        match self {
            Self::CopperWidth => 12,
            Self::CopperCopperClearance => 24,
            Self::CopperBoardClearance => 34,
            Self::CopperHoleClearance => 44,
            Self::DrillDrillClearance => 49,
            Self::DrillBoardClearance => 54,
            Self::AnnularRing => 64,
            Self::DrillDiameter => 66,
            Self::SlotWidth => 68,
            Self::AllowedSlots => 70,
            Self::PadConnection => 72,
            Self::CourtyardClearance => 74,
            Self::BoardOutline => 76,
            Self::UnplacedComponents => 78,
            Self::DefaultDevices => 88,
            Self::MissingConnections => 91,
            Self::StaleObjects => 93,
        }
    }
}

// Everything a finished or cancelled run produced.
#[derive(Debug, Default, Clone)]
pub struct RunOutcome {
    pub messages: Vec<CheckMessage>,
    pub cancelled: bool,
    pub status_log: Vec<String>,
}

// Runs the full suite with no feedback consumer.
pub fn run_drc(
    model: &mut BoardModel,
    settings: &Settings,
    quick: bool,
    cancel: &CancelToken,
) -> Result<RunOutcome> {
    DesignRuleCheck::new(settings.clone(), quick).run(model, cancel, &mut NullReporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_allowance() {
        assert!(SlotAllowance::None.allows(SlotKind::RoundDrill));
        assert!(!SlotAllowance::None.allows(SlotKind::SingleSegmentStraight));
        assert!(SlotAllowance::SingleSegmentStraight.allows(SlotKind::SingleSegmentStraight));
        assert!(!SlotAllowance::SingleSegmentStraight.allows(SlotKind::MultiSegmentStraight));
        assert!(SlotAllowance::MultiSegmentStraight.allows(SlotKind::SingleSegmentStraight));
        assert!(!SlotAllowance::MultiSegmentStraight.allows(SlotKind::Curved));
        assert!(SlotAllowance::Any.allows(SlotKind::Curved));
    }

    #[test]
    fn test_progress_schedule_is_monotone() {
        let mut last = 0;
        for c in CHECK_ORDER {
            assert!(c.progress_target() > last);
            last = c.progress_target();
        }
        assert!(last < 100);
    }

    #[test]
    fn test_quick_checks_are_prefix_of_order() {
        for c in QUICK_CHECKS {
            assert!(CHECK_ORDER[..4].contains(&c));
        }
    }
}
