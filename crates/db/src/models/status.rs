//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in discriminant order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Scheduled notification lifecycle status. Sent and Failed are terminal.
    NotificationStatus {
        Pending = 1,
        Sent = 2,
        Failed = 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::scheduling::state_machine;

    #[test]
    fn ids_match_core_state_machine() {
        assert_eq!(NotificationStatus::Pending.id(), state_machine::PENDING);
        assert_eq!(NotificationStatus::Sent.id(), state_machine::SENT);
        assert_eq!(NotificationStatus::Failed.id(), state_machine::FAILED);
    }

    #[test]
    fn all_lists_variants_in_id_order() {
        let ids: Vec<StatusId> = NotificationStatus::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
