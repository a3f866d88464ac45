use crate::infrastructure::{
    entity::EntityKind,
    error::{DdsError, DdsResult},
    status::{StatusKind, StatusMask},
};

const READER_STATUSES: &[StatusKind] = &[
    StatusKind::RequestedDeadlineMissed,
    StatusKind::RequestedIncompatibleQos,
    StatusKind::SampleLost,
    StatusKind::SampleRejected,
    StatusKind::DataAvailable,
    StatusKind::LivelinessChanged,
    StatusKind::SubscriptionMatched,
];

const WRITER_STATUSES: &[StatusKind] = &[
    StatusKind::OfferedDeadlineMissed,
    StatusKind::OfferedIncompatibleQos,
    StatusKind::LivelinessLost,
    StatusKind::PublicationMatched,
];

const TOPIC_STATUSES: &[StatusKind] = &[StatusKind::InconsistentTopic];

const ENTITY_KINDS: usize = 6;

/// Validity of the status kinds per entity kind.
///
/// *Own statuses* are the ones which can be raised on, read from and enabled on the
/// status trigger of an entity of that kind. *Listener statuses* are the ones a
/// listener installed on that kind may be enabled for, which includes the statuses
/// of all the kinds of children it can receive by inheritance.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatusConfiguration {
    own_statuses: [StatusMask; ENTITY_KINDS],
    listener_statuses: [StatusMask; ENTITY_KINDS],
    /// # Data on readers precedence
    /// A data available status raised on a reader is first offered as data on readers
    /// to the listeners of its subscriber.
    data_on_readers_precedence: bool,
}

impl StatusConfiguration {
    pub fn own_statuses(&self, kind: EntityKind) -> StatusMask {
        self.own_statuses[kind.index()]
    }

    pub fn listener_statuses(&self, kind: EntityKind) -> StatusMask {
        self.listener_statuses[kind.index()]
    }

    pub fn data_on_readers_precedence(&self) -> bool {
        self.data_on_readers_precedence
    }
}

impl Default for StatusConfiguration {
    fn default() -> Self {
        let reader = StatusMask::from(READER_STATUSES);
        let writer = StatusMask::from(WRITER_STATUSES);
        let topic = StatusMask::from(TOPIC_STATUSES);
        let subscriber_own = StatusKind::DataOnReaders.mask();

        let mut own_statuses = [StatusMask::empty(); ENTITY_KINDS];
        own_statuses[EntityKind::Topic.index()] = topic;
        own_statuses[EntityKind::Subscriber.index()] = subscriber_own;
        own_statuses[EntityKind::DataWriter.index()] = writer;
        own_statuses[EntityKind::DataReader.index()] = reader;

        let mut listener_statuses = [StatusMask::empty(); ENTITY_KINDS];
        listener_statuses[EntityKind::DomainParticipant.index()] = StatusMask::all();
        listener_statuses[EntityKind::Topic.index()] = topic;
        listener_statuses[EntityKind::Publisher.index()] = writer;
        listener_statuses[EntityKind::Subscriber.index()] = reader | subscriber_own;
        listener_statuses[EntityKind::DataWriter.index()] = writer;
        listener_statuses[EntityKind::DataReader.index()] = reader;

        Self {
            own_statuses,
            listener_statuses,
            data_on_readers_precedence: true,
        }
    }
}

#[derive(Default)]
pub struct StatusConfigurationBuilder {
    configuration: StatusConfiguration,
}

impl StatusConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            configuration: Default::default(),
        }
    }

    /// Builds the configuration after checking that every own status of an entity
    /// kind is also accepted by the listeners of that kind.
    pub fn build(self) -> DdsResult<StatusConfiguration> {
        for kind in EntityKind::ALL {
            let own = self.configuration.own_statuses(kind);
            let listener = self.configuration.listener_statuses(kind);
            if !own.is_subset_of(listener) {
                return Err(DdsError::PreconditionNotMet(format!(
                    "Own statuses {:?} of {:?} are not all accepted by its listener ({:?})",
                    own, kind, listener
                )));
            }
        }
        Ok(self.configuration)
    }

    /// Restricts the own statuses of `kind`. Only statuses which DDS defines for that
    /// entity kind are accepted.
    pub fn own_statuses(mut self, kind: EntityKind, statuses: &[StatusKind]) -> DdsResult<Self> {
        let canonical = StatusConfiguration::default().own_statuses(kind);
        self.configuration.own_statuses[kind.index()] =
            restrict(kind, statuses, canonical, "own status")?;
        Ok(self)
    }

    /// Restricts the statuses a listener installed on `kind` can be enabled for. Only
    /// statuses which an entity of that kind can receive are accepted.
    pub fn listener_statuses(
        mut self,
        kind: EntityKind,
        statuses: &[StatusKind],
    ) -> DdsResult<Self> {
        let canonical = StatusConfiguration::default().listener_statuses(kind);
        self.configuration.listener_statuses[kind.index()] =
            restrict(kind, statuses, canonical, "listener status")?;
        Ok(self)
    }

    pub fn data_on_readers_precedence(mut self, data_on_readers_precedence: bool) -> Self {
        self.configuration.data_on_readers_precedence = data_on_readers_precedence;
        self
    }
}

fn restrict(
    kind: EntityKind,
    statuses: &[StatusKind],
    canonical: StatusMask,
    role: &str,
) -> DdsResult<StatusMask> {
    let mask = StatusMask::from(statuses);
    if !mask.is_subset_of(canonical) {
        return Err(DdsError::PreconditionNotMet(format!(
            "{:?} is not a valid {} of {:?}",
            mask, role, kind
        )));
    }
    Ok(mask)
}
