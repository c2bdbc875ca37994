use crate::db::models::BloodType;

/// Recipient blood group -> donor groups that may donate to it, per standard
/// transfusion rules. Static data, total over the enum, never mutated.
pub fn compatible_donor_types(recipient: BloodType) -> &'static [BloodType] {
    use BloodType::*;
    match recipient {
        APositive => &[APositive, ANegative, OPositive, ONegative],
        ANegative => &[ANegative, ONegative],
        BPositive => &[BPositive, BNegative, OPositive, ONegative],
        BNegative => &[BNegative, ONegative],
        // Universal recipient
        AbPositive => &[
            APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive,
            ONegative,
        ],
        AbNegative => &[ANegative, BNegative, AbNegative, ONegative],
        OPositive => &[OPositive, ONegative],
        // Universal donor
        ONegative => &[ONegative],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::BloodType::*;

    #[test]
    fn every_compatibility_set_is_non_empty_and_includes_o_negative() {
        for recipient in BloodType::ALL {
            let set = compatible_donor_types(recipient);
            assert!(!set.is_empty(), "{recipient} has an empty set");
            assert!(
                set.contains(&ONegative),
                "{recipient} should accept the universal donor"
            );
        }
    }

    #[test]
    fn ab_positive_is_the_universal_recipient() {
        let set = compatible_donor_types(AbPositive);
        assert_eq!(set.len(), 8);
        for donor in BloodType::ALL {
            assert!(set.contains(&donor));
        }
    }

    #[test]
    fn o_negative_only_accepts_o_negative() {
        assert_eq!(compatible_donor_types(ONegative), &[ONegative]);
    }

    #[test]
    fn rhesus_negative_recipients_never_accept_positive_donors() {
        for recipient in [ANegative, BNegative, AbNegative, ONegative] {
            for donor in compatible_donor_types(recipient) {
                assert!(
                    !matches!(donor, APositive | BPositive | AbPositive | OPositive),
                    "{recipient} must not accept {donor}"
                );
            }
        }
    }
}
