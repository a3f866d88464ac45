use core::ops::{BitAnd, BitOr};

use super::{
    instance::{InstanceHandle, HANDLE_NIL},
    qos_policy::{QosPolicyId, INVALID_QOS_POLICY_ID},
};

/// Enumeration of the different types of communication status
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StatusKind {
    /// Another topic exists with the same name but different characteristics.
    InconsistentTopic,
    /// The deadline that the data writer has committed through its deadline QoS policy
    /// was not respected for a specific instance.
    OfferedDeadlineMissed,
    /// The deadline that the data reader was expecting through its deadline QoS policy
    /// was not respected for a specific instance.
    RequestedDeadlineMissed,
    /// A *QosPolicy* value was incompatible with what was requested.
    OfferedIncompatibleQos,
    /// A *QosPolicy* value was incompatible with what is offered.
    RequestedIncompatibleQos,
    /// A sample has been lost (never received).
    SampleLost,
    /// A (received) sample has been rejected.
    SampleRejected,
    /// New information is available in one of the readers of a subscriber.
    DataOnReaders,
    /// New information is available.
    DataAvailable,
    /// The liveliness that the data writer has committed through its liveliness QoS policy
    /// was not respected; thus data reader entities will consider the data writer as no longer *active*.
    LivelinessLost,
    /// The liveliness of one or more data writers that were writing instances read
    /// through the data reader has changed. Some data writers have become *active* or *inactive*.
    LivelinessChanged,
    /// The data writer has found a data reader that matches the topic and has compatible Qos,
    /// or has ceased to be matched with a data reader that was previously considered to be matched.
    PublicationMatched,
    /// The data reader has found a data writer that matches the topic and has compatible Qos,
    /// or has ceased to be matched with a data writer that was previously considered to be matched.
    SubscriptionMatched,
}

/// Special constant representing an empty list of communication statuses
pub const NO_STATUS: &[StatusKind] = &[];

impl StatusKind {
    pub const ALL: [StatusKind; 13] = [
        StatusKind::InconsistentTopic,
        StatusKind::OfferedDeadlineMissed,
        StatusKind::RequestedDeadlineMissed,
        StatusKind::OfferedIncompatibleQos,
        StatusKind::RequestedIncompatibleQos,
        StatusKind::SampleLost,
        StatusKind::SampleRejected,
        StatusKind::DataOnReaders,
        StatusKind::DataAvailable,
        StatusKind::LivelinessLost,
        StatusKind::LivelinessChanged,
        StatusKind::PublicationMatched,
        StatusKind::SubscriptionMatched,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn mask(self) -> StatusMask {
        StatusMask(1 << self as u32)
    }
}

/// Set of [`StatusKind`] values stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusMask(u32);

impl StatusMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self::from(&StatusKind::ALL[..])
    }

    pub const fn contains(&self, kind: StatusKind) -> bool {
        self.0 & kind.mask().0 != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_subset_of(&self, other: StatusMask) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn intersects(&self, other: StatusMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, kind: StatusKind) {
        self.0 |= kind.mask().0;
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.0 &= !kind.mask().0;
    }

    pub fn iter(&self) -> impl Iterator<Item = StatusKind> + '_ {
        StatusKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }

    pub fn to_vec(&self) -> Vec<StatusKind> {
        self.iter().collect()
    }
}

impl From<&[StatusKind]> for StatusMask {
    fn from(kinds: &[StatusKind]) -> Self {
        kinds
            .iter()
            .fold(StatusMask::empty(), |mask, kind| mask | kind.mask())
    }
}

impl From<StatusKind> for StatusMask {
    fn from(kind: StatusKind) -> Self {
        kind.mask()
    }
}

impl BitOr for StatusMask {
    type Output = StatusMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        StatusMask(self.0 | rhs.0)
    }
}

impl BitAnd for StatusMask {
    type Output = StatusMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        StatusMask(self.0 & rhs.0)
    }
}

impl core::fmt::Debug for StatusMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Structure holding the values related to the Inconsistent Topic communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct InconsistentTopicStatus {
    /// Total cumulative count of the Topics discovered whose name matches
    /// the Topic to which this status is attached and whose type is inconsistent with the Topic.
    pub total_count: i32,
    /// The incremental number of inconsistent topics discovered since the
    /// last time the listener was called or the status was read.
    pub total_count_change: i32,
}

/// Structure holding the values related to the Sample Lost communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SampleLostStatus {
    /// Total cumulative count of all samples lost across of instances of data published under the Topic.
    pub total_count: i32,
    /// The incremental number of samples lost since the last time the listener was called or the status was read.
    pub total_count_change: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SampleRejectedStatusKind {
    #[default]
    NotRejected,
    RejectedByInstancesLimit,
    RejectedBySamplesLimit,
    RejectedBySamplesPerInstanceLimit,
}

/// Structure holding the values related to the Sample Rejected communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SampleRejectedStatus {
    /// Total cumulative count of samples rejected by the DataReader.
    pub total_count: i32,
    /// The incremental number of samples rejected since the last time the listener was called or the status was read.
    pub total_count_change: i32,
    /// Reason for rejecting the last sample rejected. If no samples have been rejected, the reason is the special value NOT_REJECTED.
    pub last_reason: SampleRejectedStatusKind,
    /// Handle to the instance being updated by the last sample that was rejected.
    pub last_instance_handle: InstanceHandle,
}

/// Structure holding the values related to the Liveliness Lost communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LivelinessLostStatus {
    /// Total cumulative number of times that a previously-alive DataWriter
    /// became not alive due to a failure to actively signal its liveliness within
    /// its offered liveliness period.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
}

/// Structure holding the values related to the Liveliness Changed communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LivelinessChangedStatus {
    /// The total number of currently active DataWriters that write the Topic
    /// read by the DataReader.
    pub alive_count: i32,
    /// The total count of currently DataWriters that write the Topic read by
    /// the DataReader that are no longer asserting their liveliness.
    pub not_alive_count: i32,
    /// The change in the alive_count since the last time the listener was
    /// called or the status was read.
    pub alive_count_change: i32,
    /// The change in the not_alive_count since the last time the listener was
    /// called or the status was read.
    pub not_alive_count_change: i32,
    /// Handle to the last DataWriter whose change in liveliness caused this
    /// status to change.
    pub last_publication_handle: InstanceHandle,
}

/// Structure holding the values related to the Offered Deadline Missed communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct OfferedDeadlineMissedStatus {
    /// Total cumulative number of offered deadline periods elapsed during
    /// which a DataWriter failed to provide data.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
    /// Handle to the last instance in the DataWriter for which an offered
    /// deadline was missed.
    pub last_instance_handle: InstanceHandle,
}

/// Structure holding the values related to the Requested Deadline Missed communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RequestedDeadlineMissedStatus {
    /// Total cumulative number of missed deadlines detected for any instance
    /// read by the DataReader.
    pub total_count: i32,
    /// The incremental number of deadlines detected since the last time the
    /// listener was called or the status was read.
    pub total_count_change: i32,
    /// Handle to the last instance in the DataReader for which a deadline was detected
    pub last_instance_handle: InstanceHandle,
}

/// Structure associating the QosPolicyId and the number of time it appeared in the related communication status.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QosPolicyCount {
    pub policy_id: QosPolicyId,
    pub count: i32,
}

/// Structure holding the values related to the Offered Incompatible Qos communication status.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OfferedIncompatibleQosStatus {
    /// Total cumulative number of times the concerned DataWriter
    /// discovered a DataReader for the same Topic with a requested QoS that
    /// is incompatible with that offered by the DataWriter.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
    /// The PolicyId_t of one of the policies that was found to be
    /// incompatible the last time an incompatibility was detected.
    pub last_policy_id: QosPolicyId,
    /// A list containing for each policy the total number of times that the
    /// concerned DataWriter discovered an incompatible DataReader.
    pub policies: Vec<QosPolicyCount>,
}

impl Default for OfferedIncompatibleQosStatus {
    fn default() -> Self {
        Self {
            total_count: 0,
            total_count_change: 0,
            last_policy_id: INVALID_QOS_POLICY_ID,
            policies: Vec::new(),
        }
    }
}

/// Structure holding the values related to the Requested Incompatible Qos communication status.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RequestedIncompatibleQosStatus {
    /// Total cumulative number of times the concerned DataReader
    /// discovered a DataWriter for the same Topic with an offered QoS that
    /// was incompatible with that requested by the DataReader.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
    /// The QosPolicyId of one of the policies that was found to be
    /// incompatible the last time an incompatibility was detected.
    pub last_policy_id: QosPolicyId,
    /// A list containing for each policy the total number of times that the
    /// concerned DataReader discovered an incompatible DataWriter.
    pub policies: Vec<QosPolicyCount>,
}

impl Default for RequestedIncompatibleQosStatus {
    fn default() -> Self {
        Self {
            total_count: 0,
            total_count_change: 0,
            last_policy_id: INVALID_QOS_POLICY_ID,
            policies: Vec::new(),
        }
    }
}

/// Structure holding the values related to the Publication Matched communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PublicationMatchedStatus {
    /// Total cumulative count the concerned DataWriter discovered a
    /// “match” with a DataReader.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
    /// Handle to the last DataReader that matched the DataWriter causing the
    /// status to change.
    pub last_subscription_handle: InstanceHandle,
    /// The number of DataReaders currently matched to the concerned
    /// DataWriter.
    pub current_count: i32,
    /// The change in current_count since the last time the listener was called
    /// or the status was read.
    pub current_count_change: i32,
}

/// Structure holding the values related to the Subscription Matched communication status.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SubscriptionMatchedStatus {
    /// Total cumulative count the concerned DataReader discovered a
    /// “match” with a DataWriter.
    pub total_count: i32,
    /// The change in total_count since the last time the listener was called or
    /// the status was read.
    pub total_count_change: i32,
    /// Handle to the last DataWriter that matched the DataReader causing the
    /// status to change.
    pub last_publication_handle: InstanceHandle,
    /// The number of DataWriters currently matched to the concerned
    /// DataReader.
    pub current_count: i32,
    /// The change in current_count since the last time the listener was called
    /// or the status was read.
    pub current_count_change: i32,
}

/// Snapshot of the accumulated value of one communication status, as read from an entity
/// or handed to a listener callback.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Status {
    InconsistentTopic(InconsistentTopicStatus),
    OfferedDeadlineMissed(OfferedDeadlineMissedStatus),
    RequestedDeadlineMissed(RequestedDeadlineMissedStatus),
    OfferedIncompatibleQos(OfferedIncompatibleQosStatus),
    RequestedIncompatibleQos(RequestedIncompatibleQosStatus),
    SampleLost(SampleLostStatus),
    SampleRejected(SampleRejectedStatus),
    DataOnReaders,
    DataAvailable,
    LivelinessLost(LivelinessLostStatus),
    LivelinessChanged(LivelinessChangedStatus),
    PublicationMatched(PublicationMatchedStatus),
    SubscriptionMatched(SubscriptionMatchedStatus),
}

impl Status {
    pub fn kind(&self) -> StatusKind {
        match self {
            Status::InconsistentTopic(_) => StatusKind::InconsistentTopic,
            Status::OfferedDeadlineMissed(_) => StatusKind::OfferedDeadlineMissed,
            Status::RequestedDeadlineMissed(_) => StatusKind::RequestedDeadlineMissed,
            Status::OfferedIncompatibleQos(_) => StatusKind::OfferedIncompatibleQos,
            Status::RequestedIncompatibleQos(_) => StatusKind::RequestedIncompatibleQos,
            Status::SampleLost(_) => StatusKind::SampleLost,
            Status::SampleRejected(_) => StatusKind::SampleRejected,
            Status::DataOnReaders => StatusKind::DataOnReaders,
            Status::DataAvailable => StatusKind::DataAvailable,
            Status::LivelinessLost(_) => StatusKind::LivelinessLost,
            Status::LivelinessChanged(_) => StatusKind::LivelinessChanged,
            Status::PublicationMatched(_) => StatusKind::PublicationMatched,
            Status::SubscriptionMatched(_) => StatusKind::SubscriptionMatched,
        }
    }
}

/// A change of communication status raised on an entity by the network, timer or discovery
/// activity. Incremental kinds carry a non-negative `delta` which is added to the cumulative
/// count, latest-value kinds carry the current absolute values which replace the unread ones.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StatusChange {
    InconsistentTopic {
        delta: i32,
    },
    OfferedDeadlineMissed {
        delta: i32,
        last_instance_handle: InstanceHandle,
    },
    RequestedDeadlineMissed {
        delta: i32,
        last_instance_handle: InstanceHandle,
    },
    OfferedIncompatibleQos {
        delta: i32,
        last_policy_id: QosPolicyId,
    },
    RequestedIncompatibleQos {
        delta: i32,
        last_policy_id: QosPolicyId,
    },
    SampleLost {
        delta: i32,
    },
    SampleRejected {
        delta: i32,
        last_reason: SampleRejectedStatusKind,
        last_instance_handle: InstanceHandle,
    },
    DataOnReaders,
    DataAvailable,
    LivelinessLost {
        delta: i32,
    },
    LivelinessChanged {
        alive_count: i32,
        not_alive_count: i32,
        last_publication_handle: InstanceHandle,
    },
    PublicationMatched {
        total_count: i32,
        current_count: i32,
        last_subscription_handle: InstanceHandle,
    },
    SubscriptionMatched {
        total_count: i32,
        current_count: i32,
        last_publication_handle: InstanceHandle,
    },
}

impl StatusChange {
    pub fn kind(&self) -> StatusKind {
        match self {
            StatusChange::InconsistentTopic { .. } => StatusKind::InconsistentTopic,
            StatusChange::OfferedDeadlineMissed { .. } => StatusKind::OfferedDeadlineMissed,
            StatusChange::RequestedDeadlineMissed { .. } => StatusKind::RequestedDeadlineMissed,
            StatusChange::OfferedIncompatibleQos { .. } => StatusKind::OfferedIncompatibleQos,
            StatusChange::RequestedIncompatibleQos { .. } => StatusKind::RequestedIncompatibleQos,
            StatusChange::SampleLost { .. } => StatusKind::SampleLost,
            StatusChange::SampleRejected { .. } => StatusKind::SampleRejected,
            StatusChange::DataOnReaders => StatusKind::DataOnReaders,
            StatusChange::DataAvailable => StatusKind::DataAvailable,
            StatusChange::LivelinessLost { .. } => StatusKind::LivelinessLost,
            StatusChange::LivelinessChanged { .. } => StatusKind::LivelinessChanged,
            StatusChange::PublicationMatched { .. } => StatusKind::PublicationMatched,
            StatusChange::SubscriptionMatched { .. } => StatusKind::SubscriptionMatched,
        }
    }

    /// Deadline missed on a data reader for an unspecified instance.
    pub fn requested_deadline_missed(delta: i32) -> Self {
        StatusChange::RequestedDeadlineMissed {
            delta,
            last_instance_handle: HANDLE_NIL,
        }
    }

    /// Deadline missed on a data writer for an unspecified instance.
    pub fn offered_deadline_missed(delta: i32) -> Self {
        StatusChange::OfferedDeadlineMissed {
            delta,
            last_instance_handle: HANDLE_NIL,
        }
    }
}
