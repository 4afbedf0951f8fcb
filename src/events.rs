use std::fmt;

/// Notifications emitted by the hover passes and the draw cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
    NodesEntered(Vec<String>),
    NodesExited(Vec<String>),
    EdgesEntered(Vec<String>),
    EdgesExited(Vec<String>),
    GraphScaled,
    Drawn,
}

impl GraphEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodesEntered(_) => "overnodes",
            Self::NodesExited(_) => "outnodes",
            Self::EdgesEntered(_) => "overedges",
            Self::EdgesExited(_) => "outedges",
            Self::GraphScaled => "graphscaled",
            Self::Drawn => "draw",
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            Self::NodesEntered(ids)
            | Self::NodesExited(ids)
            | Self::EdgesEntered(ids)
            | Self::EdgesExited(ids) => ids,
            Self::GraphScaled | Self::Drawn => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

type Subscriber = Box<dyn FnMut(&GraphEvent)>;

/// Ordered subscriber list; every subscriber sees every event in dispatch order.
#[derive(Default)]
pub struct EventBus {
    next_id: usize,
    subscribers: Vec<(SubscriberId, Subscriber)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GraphEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        self.subscribers.len() != before
    }

    pub fn dispatch(&mut self, event: GraphEvent) {
        log::trace!("dispatch {} ({} ids)", event.name(), event.ids().len());
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn subscribers_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        bus.dispatch(GraphEvent::GraphScaled);
        bus.dispatch(GraphEvent::NodesEntered(vec!["a".into()]));

        assert_eq!(
            *seen.borrow(),
            vec![
                GraphEvent::GraphScaled,
                GraphEvent::NodesEntered(vec!["a".into()])
            ]
        );
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&count);
        let id = bus.subscribe(move |_| *sink.borrow_mut() += 1);

        bus.dispatch(GraphEvent::Drawn);
        assert!(bus.unsubscribe(id));
        bus.dispatch(GraphEvent::Drawn);

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
        assert!(!bus.unsubscribe(id));
    }
}
