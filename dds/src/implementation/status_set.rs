use crate::infrastructure::{
    qos_policy::QosPolicyId,
    status::{
        InconsistentTopicStatus, LivelinessChangedStatus, LivelinessLostStatus,
        OfferedDeadlineMissedStatus, OfferedIncompatibleQosStatus, PublicationMatchedStatus,
        QosPolicyCount, RequestedDeadlineMissedStatus, RequestedIncompatibleQosStatus,
        SampleLostStatus, SampleRejectedStatus, Status, StatusChange, StatusKind, StatusMask,
        SubscriptionMatchedStatus,
    },
};

/// Accumulated communication statuses of a single entity.
///
/// The `*_change` fields are reset every time a status is taken while the cumulative
/// counts live as long as the entity.
#[derive(Default, Debug)]
pub struct StatusSet {
    changes: StatusMask,
    inconsistent_topic: InconsistentTopicStatus,
    offered_deadline_missed: OfferedDeadlineMissedStatus,
    requested_deadline_missed: RequestedDeadlineMissedStatus,
    offered_incompatible_qos: OfferedIncompatibleQosStatus,
    requested_incompatible_qos: RequestedIncompatibleQosStatus,
    sample_lost: SampleLostStatus,
    sample_rejected: SampleRejectedStatus,
    liveliness_lost: LivelinessLostStatus,
    liveliness_changed: LivelinessChangedStatus,
    publication_matched: PublicationMatchedStatus,
    subscription_matched: SubscriptionMatchedStatus,
}

fn add_count(total_count: &mut i32, total_count_change: &mut i32, delta: i32) {
    // Counts only ever grow
    let delta = delta.max(0);
    *total_count = total_count.saturating_add(delta);
    *total_count_change = total_count_change.saturating_add(delta);
}

fn replace_count(count: &mut i32, count_change: &mut i32, value: i32) {
    *count_change = count_change.saturating_add(value.saturating_sub(*count));
    *count = value;
}

fn increment_policy_count(policies: &mut Vec<QosPolicyCount>, policy_id: QosPolicyId, delta: i32) {
    match policies.iter_mut().find(|p| p.policy_id == policy_id) {
        Some(policy) => policy.count = policy.count.saturating_add(delta.max(0)),
        None => policies.push(QosPolicyCount {
            policy_id,
            count: delta.max(0),
        }),
    }
}

impl StatusSet {
    pub fn changes(&self) -> StatusMask {
        self.changes
    }

    pub fn merge(&mut self, change: &StatusChange) {
        match *change {
            StatusChange::InconsistentTopic { delta } => {
                let s = &mut self.inconsistent_topic;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
            }
            StatusChange::OfferedDeadlineMissed {
                delta,
                last_instance_handle,
            } => {
                let s = &mut self.offered_deadline_missed;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
                s.last_instance_handle = last_instance_handle;
            }
            StatusChange::RequestedDeadlineMissed {
                delta,
                last_instance_handle,
            } => {
                let s = &mut self.requested_deadline_missed;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
                s.last_instance_handle = last_instance_handle;
            }
            StatusChange::OfferedIncompatibleQos {
                delta,
                last_policy_id,
            } => {
                let s = &mut self.offered_incompatible_qos;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
                s.last_policy_id = last_policy_id;
                increment_policy_count(&mut s.policies, last_policy_id, delta);
            }
            StatusChange::RequestedIncompatibleQos {
                delta,
                last_policy_id,
            } => {
                let s = &mut self.requested_incompatible_qos;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
                s.last_policy_id = last_policy_id;
                increment_policy_count(&mut s.policies, last_policy_id, delta);
            }
            StatusChange::SampleLost { delta } => {
                let s = &mut self.sample_lost;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
            }
            StatusChange::SampleRejected {
                delta,
                last_reason,
                last_instance_handle,
            } => {
                let s = &mut self.sample_rejected;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
                s.last_reason = last_reason;
                s.last_instance_handle = last_instance_handle;
            }
            StatusChange::DataOnReaders | StatusChange::DataAvailable => (),
            StatusChange::LivelinessLost { delta } => {
                let s = &mut self.liveliness_lost;
                add_count(&mut s.total_count, &mut s.total_count_change, delta);
            }
            StatusChange::LivelinessChanged {
                alive_count,
                not_alive_count,
                last_publication_handle,
            } => {
                let s = &mut self.liveliness_changed;
                replace_count(&mut s.alive_count, &mut s.alive_count_change, alive_count);
                replace_count(
                    &mut s.not_alive_count,
                    &mut s.not_alive_count_change,
                    not_alive_count,
                );
                s.last_publication_handle = last_publication_handle;
            }
            StatusChange::PublicationMatched {
                total_count,
                current_count,
                last_subscription_handle,
            } => {
                let s = &mut self.publication_matched;
                replace_count(&mut s.total_count, &mut s.total_count_change, total_count);
                replace_count(&mut s.current_count, &mut s.current_count_change, current_count);
                s.last_subscription_handle = last_subscription_handle;
            }
            StatusChange::SubscriptionMatched {
                total_count,
                current_count,
                last_publication_handle,
            } => {
                let s = &mut self.subscription_matched;
                replace_count(&mut s.total_count, &mut s.total_count_change, total_count);
                replace_count(&mut s.current_count, &mut s.current_count_change, current_count);
                s.last_publication_handle = last_publication_handle;
            }
        }
        self.changes.insert(change.kind());
    }

    /// Returns the accumulated value without clearing it.
    pub fn read(&self, kind: StatusKind) -> Status {
        match kind {
            StatusKind::InconsistentTopic => {
                Status::InconsistentTopic(self.inconsistent_topic.clone())
            }
            StatusKind::OfferedDeadlineMissed => {
                Status::OfferedDeadlineMissed(self.offered_deadline_missed.clone())
            }
            StatusKind::RequestedDeadlineMissed => {
                Status::RequestedDeadlineMissed(self.requested_deadline_missed.clone())
            }
            StatusKind::OfferedIncompatibleQos => {
                Status::OfferedIncompatibleQos(self.offered_incompatible_qos.clone())
            }
            StatusKind::RequestedIncompatibleQos => {
                Status::RequestedIncompatibleQos(self.requested_incompatible_qos.clone())
            }
            StatusKind::SampleLost => Status::SampleLost(self.sample_lost.clone()),
            StatusKind::SampleRejected => Status::SampleRejected(self.sample_rejected.clone()),
            StatusKind::DataOnReaders => Status::DataOnReaders,
            StatusKind::DataAvailable => Status::DataAvailable,
            StatusKind::LivelinessLost => Status::LivelinessLost(self.liveliness_lost.clone()),
            StatusKind::LivelinessChanged => {
                Status::LivelinessChanged(self.liveliness_changed.clone())
            }
            StatusKind::PublicationMatched => {
                Status::PublicationMatched(self.publication_matched.clone())
            }
            StatusKind::SubscriptionMatched => {
                Status::SubscriptionMatched(self.subscription_matched.clone())
            }
        }
    }

    /// Returns the accumulated value and whether it had changed since the previous take,
    /// then resets the change indication and the `*_change` fields.
    pub fn read_and_clear(&mut self, kind: StatusKind) -> (Status, bool) {
        let status = self.read(kind);
        let was_changed = self.changes.contains(kind);
        self.changes.remove(kind);
        match kind {
            StatusKind::InconsistentTopic => self.inconsistent_topic.total_count_change = 0,
            StatusKind::OfferedDeadlineMissed => {
                self.offered_deadline_missed.total_count_change = 0
            }
            StatusKind::RequestedDeadlineMissed => {
                self.requested_deadline_missed.total_count_change = 0
            }
            StatusKind::OfferedIncompatibleQos => {
                self.offered_incompatible_qos.total_count_change = 0
            }
            StatusKind::RequestedIncompatibleQos => {
                self.requested_incompatible_qos.total_count_change = 0
            }
            StatusKind::SampleLost => self.sample_lost.total_count_change = 0,
            StatusKind::SampleRejected => self.sample_rejected.total_count_change = 0,
            StatusKind::DataOnReaders | StatusKind::DataAvailable => (),
            StatusKind::LivelinessLost => self.liveliness_lost.total_count_change = 0,
            StatusKind::LivelinessChanged => {
                self.liveliness_changed.alive_count_change = 0;
                self.liveliness_changed.not_alive_count_change = 0;
            }
            StatusKind::PublicationMatched => {
                self.publication_matched.total_count_change = 0;
                self.publication_matched.current_count_change = 0;
            }
            StatusKind::SubscriptionMatched => {
                self.subscription_matched.total_count_change = 0;
                self.subscription_matched.current_count_change = 0;
            }
        }
        (status, was_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        instance::{InstanceHandle, HANDLE_NIL},
        qos_policy::{DEADLINE_QOS_POLICY_ID, RELIABILITY_QOS_POLICY_ID},
        status::SampleRejectedStatusKind,
    };

    #[test]
    fn incremental_counts_accumulate_until_read() {
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::SampleLost { delta: 3 });
        status_set.merge(&StatusChange::SampleLost { delta: 5 });
        assert!(status_set.changes().contains(StatusKind::SampleLost));

        let (status, was_changed) = status_set.read_and_clear(StatusKind::SampleLost);
        assert!(was_changed);
        assert_eq!(
            status,
            Status::SampleLost(SampleLostStatus {
                total_count: 8,
                total_count_change: 8,
            })
        );
        assert!(!status_set.changes().contains(StatusKind::SampleLost));

        let (status, was_changed) = status_set.read_and_clear(StatusKind::SampleLost);
        assert!(!was_changed);
        assert_eq!(
            status,
            Status::SampleLost(SampleLostStatus {
                total_count: 8,
                total_count_change: 0,
            })
        );

        status_set.merge(&StatusChange::SampleLost { delta: 1 });
        assert!(status_set.changes().contains(StatusKind::SampleLost));
        let (status, _) = status_set.read_and_clear(StatusKind::SampleLost);
        assert_eq!(
            status,
            Status::SampleLost(SampleLostStatus {
                total_count: 9,
                total_count_change: 1,
            })
        );
    }

    #[test]
    fn negative_delta_does_not_decrease_total_count() {
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::LivelinessLost { delta: 2 });
        status_set.merge(&StatusChange::LivelinessLost { delta: -7 });
        assert_eq!(
            status_set.read(StatusKind::LivelinessLost),
            Status::LivelinessLost(LivelinessLostStatus {
                total_count: 2,
                total_count_change: 2,
            })
        );
    }

    #[test]
    fn latest_value_replaces_unread_value() {
        let first_writer = InstanceHandle::new([1; 16]);
        let second_writer = InstanceHandle::new([2; 16]);
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::LivelinessChanged {
            alive_count: 1,
            not_alive_count: 0,
            last_publication_handle: first_writer,
        });
        status_set.merge(&StatusChange::LivelinessChanged {
            alive_count: 1,
            not_alive_count: 1,
            last_publication_handle: second_writer,
        });

        let (status, was_changed) = status_set.read_and_clear(StatusKind::LivelinessChanged);
        assert!(was_changed);
        assert_eq!(
            status,
            Status::LivelinessChanged(LivelinessChangedStatus {
                alive_count: 1,
                not_alive_count: 1,
                alive_count_change: 1,
                not_alive_count_change: 1,
                last_publication_handle: second_writer,
            })
        );

        status_set.merge(&StatusChange::LivelinessChanged {
            alive_count: 0,
            not_alive_count: 2,
            last_publication_handle: first_writer,
        });
        let (status, _) = status_set.read_and_clear(StatusKind::LivelinessChanged);
        assert_eq!(
            status,
            Status::LivelinessChanged(LivelinessChangedStatus {
                alive_count: 0,
                not_alive_count: 2,
                alive_count_change: -1,
                not_alive_count_change: 1,
                last_publication_handle: first_writer,
            })
        );
    }

    #[test]
    fn matched_status_changes_are_relative_to_last_read() {
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::PublicationMatched {
            total_count: 1,
            current_count: 1,
            last_subscription_handle: HANDLE_NIL,
        });
        status_set.merge(&StatusChange::PublicationMatched {
            total_count: 2,
            current_count: 2,
            last_subscription_handle: HANDLE_NIL,
        });
        let (status, _) = status_set.read_and_clear(StatusKind::PublicationMatched);
        assert_eq!(
            status,
            Status::PublicationMatched(PublicationMatchedStatus {
                total_count: 2,
                total_count_change: 2,
                last_subscription_handle: HANDLE_NIL,
                current_count: 2,
                current_count_change: 2,
            })
        );

        status_set.merge(&StatusChange::PublicationMatched {
            total_count: 2,
            current_count: 1,
            last_subscription_handle: HANDLE_NIL,
        });
        let (status, _) = status_set.read_and_clear(StatusKind::PublicationMatched);
        assert_eq!(
            status,
            Status::PublicationMatched(PublicationMatchedStatus {
                total_count: 2,
                total_count_change: 0,
                last_subscription_handle: HANDLE_NIL,
                current_count: 1,
                current_count_change: -1,
            })
        );
    }

    #[test]
    fn incompatible_qos_counts_per_policy() {
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::RequestedIncompatibleQos {
            delta: 1,
            last_policy_id: RELIABILITY_QOS_POLICY_ID,
        });
        status_set.merge(&StatusChange::RequestedIncompatibleQos {
            delta: 1,
            last_policy_id: DEADLINE_QOS_POLICY_ID,
        });
        status_set.merge(&StatusChange::RequestedIncompatibleQos {
            delta: 1,
            last_policy_id: RELIABILITY_QOS_POLICY_ID,
        });

        let Status::RequestedIncompatibleQos(status) =
            status_set.read(StatusKind::RequestedIncompatibleQos)
        else {
            panic!("Wrong status kind")
        };
        assert_eq!(status.total_count, 3);
        assert_eq!(status.last_policy_id, RELIABILITY_QOS_POLICY_ID);
        assert_eq!(
            status.policies,
            vec![
                QosPolicyCount {
                    policy_id: RELIABILITY_QOS_POLICY_ID,
                    count: 2
                },
                QosPolicyCount {
                    policy_id: DEADLINE_QOS_POLICY_ID,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn sample_rejected_keeps_last_reason() {
        let instance = InstanceHandle::new([9; 16]);
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::SampleRejected {
            delta: 1,
            last_reason: SampleRejectedStatusKind::RejectedBySamplesLimit,
            last_instance_handle: instance,
        });
        let (status, _) = status_set.read_and_clear(StatusKind::SampleRejected);
        assert_eq!(
            status,
            Status::SampleRejected(SampleRejectedStatus {
                total_count: 1,
                total_count_change: 1,
                last_reason: SampleRejectedStatusKind::RejectedBySamplesLimit,
                last_instance_handle: instance,
            })
        );
    }

    #[test]
    fn changes_mask_tracks_every_kind() {
        let mut status_set = StatusSet::default();
        status_set.merge(&StatusChange::DataAvailable);
        status_set.merge(&StatusChange::requested_deadline_missed(1));
        assert_eq!(
            status_set.changes(),
            StatusKind::DataAvailable.mask() | StatusKind::RequestedDeadlineMissed.mask()
        );
        let (status, was_changed) = status_set.read_and_clear(StatusKind::DataAvailable);
        assert_eq!(status, Status::DataAvailable);
        assert!(was_changed);
        assert_eq!(
            status_set.changes(),
            StatusKind::RequestedDeadlineMissed.mask()
        );
    }
}
