use std::collections::BTreeSet;

use crate::check::msg::CheckMessage;
use crate::sexpr::Sexpr;

// Splits messages into approved ones (counted) and the remainder, matched
// by canonical approval key.
pub fn resolve_approvals(
    messages: &[CheckMessage],
    approved: &BTreeSet<Sexpr>,
) -> (usize, Vec<CheckMessage>) {
    let mut count = 0;
    let mut remaining = Vec::new();
    for msg in messages {
        if approved.contains(msg.approval()) {
            count += 1;
        } else {
            remaining.push(msg.clone());
        }
    }
    (count, remaining)
}

// Presentation order: most severe first, then by message text. Stable, so
// equal entries keep their emission order.
pub fn sort_for_presentation(msgs: &mut [CheckMessage]) {
    msgs.sort_by(|a, b| {
        b.severity().cmp(&a.severity()).then_with(|| a.message().cmp(b.message()))
    });
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::check::msg::{ObjectKind, ObjectRef};
    use crate::geom::units::{Length, UnsignedLength};

    fn msg(n: u128) -> CheckMessage {
        let obj = ObjectRef::new(ObjectKind::NetLine, Uuid::from_u128(n));
        CheckMessage::minimum_width_violation(
            &obj,
            Length::nm(100_000),
            UnsignedLength::nm(200_000),
            Vec::new(),
        )
    }

    #[test]
    fn test_resolve_approvals() {
        let msgs = vec![msg(1), msg(2), msg(3)];
        let mut approved = BTreeSet::new();
        approved.insert(msgs[1].approval().clone());
        // An approval that matches nothing is simply ignored.
        approved.insert(Sexpr::node("approved").with_atom("stale"));
        let (count, remaining) = resolve_approvals(&msgs, &approved);
        assert_eq!(count, 1);
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0], msgs[0]);
        assert_eq!(remaining[1], msgs[2]);
    }

    #[test]
    fn test_approval_survives_round_trip() {
        let m = msg(7);
        let text = m.approval().canonical();
        let mut approved = BTreeSet::new();
        approved.insert(Sexpr::parse(&text).unwrap());
        let (count, remaining) = resolve_approvals(&[m], &approved);
        assert_eq!(count, 1);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_presentation_sort() {
        let warn = CheckMessage::courtyard_overlap(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            Vec::new(),
        );
        let err = msg(1);
        let mut msgs = vec![warn.clone(), err.clone()];
        sort_for_presentation(&mut msgs);
        assert_eq!(msgs[0], err);
        assert_eq!(msgs[1], warn);
    }
}
