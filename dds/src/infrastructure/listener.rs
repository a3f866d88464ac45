use std::sync::Arc;

use super::{
    entity::Entity,
    status::{
        InconsistentTopicStatus, LivelinessChangedStatus, LivelinessLostStatus,
        OfferedDeadlineMissedStatus, OfferedIncompatibleQosStatus, PublicationMatchedStatus,
        RequestedDeadlineMissedStatus, RequestedIncompatibleQosStatus, SampleLostStatus,
        SampleRejectedStatus, Status, StatusKind, StatusMask, SubscriptionMatchedStatus,
    },
};

/// Callback bound to one status kind. It receives the entity on which the status was
/// raised, which is not necessarily the entity the listener is installed on.
pub type ListenerCallback = Arc<dyn Fn(&Entity, &Status) + Send + Sync>;

/// Special constant to indicate that no listener is installed on the entity.
pub const NO_LISTENER: Option<Listener> = None;

/// Set of callbacks, one optional callback per [`StatusKind`].
///
/// Which of the callbacks are actually used is decided by the status mask given when
/// the listener is installed with [`Entity::set_listener`]. A kind which is enabled in
/// the mask but has no callback bound is consumed by the listener without any call,
/// and is not propagated to the listeners of the parent entities.
#[derive(Clone, Default)]
pub struct Listener {
    callbacks: [Option<ListenerCallback>; StatusKind::ALL.len()],
}

macro_rules! status_callback {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $status:ty) => {
        $(#[$doc])*
        pub fn $name(self, f: impl Fn(&Entity, $status) + Send + Sync + 'static) -> Self {
            self.on_status(StatusKind::$variant, move |entity, status| {
                if let Status::$variant(status) = status {
                    f(entity, status.clone())
                }
            })
        }
    };
}

impl Listener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `f` to the status `kind`, replacing any previously bound callback.
    pub fn on_status(
        mut self,
        kind: StatusKind,
        f: impl Fn(&Entity, &Status) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks[kind.index()] = Some(Arc::new(f));
        self
    }

    /// Removes the callback bound to `kind`, if any.
    pub fn unbind(mut self, kind: StatusKind) -> Self {
        self.callbacks[kind.index()] = None;
        self
    }

    status_callback!(
        /// Method that is called when a topic with the same name but different characteristics is discovered.
        on_inconsistent_topic,
        InconsistentTopic,
        InconsistentTopicStatus
    );
    status_callback!(
        /// Method that is called when a writer reports an offered deadline missed status.
        on_offered_deadline_missed,
        OfferedDeadlineMissed,
        OfferedDeadlineMissedStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a requested deadline missed status.
        on_requested_deadline_missed,
        RequestedDeadlineMissed,
        RequestedDeadlineMissedStatus
    );
    status_callback!(
        /// Method that is called when a writer reports an offered incompatible qos status.
        on_offered_incompatible_qos,
        OfferedIncompatibleQos,
        OfferedIncompatibleQosStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a requested incompatible qos status.
        on_requested_incompatible_qos,
        RequestedIncompatibleQos,
        RequestedIncompatibleQosStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a sample lost status.
        on_sample_lost,
        SampleLost,
        SampleLostStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a sample rejected status.
        on_sample_rejected,
        SampleRejected,
        SampleRejectedStatus
    );
    status_callback!(
        /// Method that is called when a writer reports a liveliness lost status.
        on_liveliness_lost,
        LivelinessLost,
        LivelinessLostStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a liveliness changed status.
        on_liveliness_changed,
        LivelinessChanged,
        LivelinessChangedStatus
    );
    status_callback!(
        /// Method that is called when a writer reports a publication matched status.
        on_publication_matched,
        PublicationMatched,
        PublicationMatchedStatus
    );
    status_callback!(
        /// Method that is called when a reader reports a subscription matched status.
        on_subscription_matched,
        SubscriptionMatched,
        SubscriptionMatchedStatus
    );

    /// Method that is called when new data is available on a reader.
    pub fn on_data_available(self, f: impl Fn(&Entity) + Send + Sync + 'static) -> Self {
        self.on_status(StatusKind::DataAvailable, move |entity, _| f(entity))
    }

    /// Method that is called when new data is available on any of the readers of a subscriber.
    pub fn on_data_on_readers(self, f: impl Fn(&Entity) + Send + Sync + 'static) -> Self {
        self.on_status(StatusKind::DataOnReaders, move |entity, _| f(entity))
    }

    /// Copies into this listener the callbacks of `other` for the kinds which have
    /// no callback bound here.
    pub fn merge(&mut self, other: &Listener) {
        for (callback, other_callback) in self.callbacks.iter_mut().zip(other.callbacks.iter()) {
            if callback.is_none() {
                callback.clone_from(other_callback);
            }
        }
    }

    pub fn is_bound(&self, kind: StatusKind) -> bool {
        self.callbacks[kind.index()].is_some()
    }

    pub fn bound_statuses(&self) -> StatusMask {
        StatusKind::ALL
            .into_iter()
            .filter(|kind| self.is_bound(*kind))
            .fold(StatusMask::empty(), |mask, kind| mask | kind.mask())
    }

    pub(crate) fn callback(&self, kind: StatusKind) -> Option<ListenerCallback> {
        self.callbacks[kind.index()].clone()
    }
}

impl core::fmt::Debug for Listener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("bound_statuses", &self.bound_statuses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_setters_bind_their_kind() {
        let listener = Listener::new()
            .on_sample_lost(|_, _| ())
            .on_data_available(|_| ());
        assert!(listener.is_bound(StatusKind::SampleLost));
        assert!(listener.is_bound(StatusKind::DataAvailable));
        assert!(!listener.is_bound(StatusKind::DataOnReaders));
        assert_eq!(
            listener.bound_statuses(),
            StatusKind::SampleLost.mask() | StatusKind::DataAvailable.mask()
        );
    }

    #[test]
    fn unbind_removes_callback() {
        let listener = Listener::new()
            .on_liveliness_lost(|_, _| ())
            .unbind(StatusKind::LivelinessLost);
        assert!(listener.bound_statuses().is_empty());
    }

    #[test]
    fn merge_keeps_own_callbacks_and_fills_missing_ones() {
        let mut listener = Listener::new().on_sample_lost(|_, _| ());
        let own_callback = listener.callback(StatusKind::SampleLost).unwrap();
        let other = Listener::new()
            .on_sample_lost(|_, _| ())
            .on_subscription_matched(|_, _| ());

        listener.merge(&other);

        assert!(Arc::ptr_eq(
            &listener.callback(StatusKind::SampleLost).unwrap(),
            &own_callback
        ));
        assert!(listener.is_bound(StatusKind::SubscriptionMatched));
    }
}
