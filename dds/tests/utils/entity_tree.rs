use dust_dds_status::{
    configuration::StatusConfiguration,
    infrastructure::entity::{Entity, EntityFactory, EntityKind},
};

/// Participant with one entity of every kind below it.
pub struct EntityTree {
    pub participant: Entity,
    pub topic: Entity,
    pub publisher: Entity,
    pub writer: Entity,
    pub subscriber: Entity,
    pub reader: Entity,
}

impl EntityTree {
    pub fn new() -> Self {
        Self::with_configuration(StatusConfiguration::default())
    }

    pub fn with_configuration(configuration: StatusConfiguration) -> Self {
        let participant = EntityFactory::new(configuration).create_participant();
        let topic = participant.create_child(EntityKind::Topic).unwrap();
        let publisher = participant.create_child(EntityKind::Publisher).unwrap();
        let writer = publisher.create_child(EntityKind::DataWriter).unwrap();
        let subscriber = participant.create_child(EntityKind::Subscriber).unwrap();
        let reader = subscriber.create_child(EntityKind::DataReader).unwrap();
        Self {
            participant,
            topic,
            publisher,
            writer,
            subscriber,
            reader,
        }
    }
}
