use std::collections::HashSet;

use tracing::debug;

use crate::api::ContactListener;
use crate::types::*;

/// Stable identifier for a contact; never reused within a manager.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(pub u64);

/// Two colliders that currently overlap. `(a, b)` and `(b, a)` are the same contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub a_key: Option<UserKey>,
    pub b_key: Option<UserKey>,
    /// True if either collider is a sensor (no collision response).
    pub sensor: bool,
}

impl Contact {
    /// Order-independent key for the collider pair.
    pub fn pair(&self) -> (ColliderHandle, ColliderHandle) {
        pair_key(self.collider_a, self.collider_b)
    }

    pub fn involves(&self, collider: ColliderHandle) -> bool {
        self.collider_a == collider || self.collider_b == collider
    }

    fn matches(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        (self.collider_a == a && self.collider_b == b) || (self.collider_a == b && self.collider_b == a)
    }
}

pub(crate) fn pair_key(a: ColliderHandle, b: ColliderHandle) -> (ColliderHandle, ColliderHandle) {
    if a < b { (a, b) } else { (b, a) }
}

/// Contact notification, as buffered by [`ContactRecorder`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ContactEvent {
    Begin(Contact),
    End(Contact),
}

/// Listener that buffers every notification until drained.
#[derive(Clone, Debug, Default)]
pub struct ContactRecorder {
    events: Vec<ContactEvent>,
}

impl ContactRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Drain and return the accumulated events.
    pub fn drain(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ContactListener for ContactRecorder {
    fn begin_contact(&mut self, contact: &Contact) {
        self.events.push(ContactEvent::Begin(*contact));
    }

    fn end_contact(&mut self, contact: &Contact) {
        self.events.push(ContactEvent::End(*contact));
    }
}

/// The set of active contacts. Lookups scan linearly; contact counts are small.
#[derive(Clone, Debug, Default)]
pub struct ContactManager {
    contacts: Vec<(ContactId, Contact)>,
    next_id: u64,
}

impl ContactManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactId, &Contact)> + '_ {
        self.contacts.iter().map(|(id, c)| (*id, c))
    }

    /// Register a contact for its collider pair. Returns `None` if the pair
    /// already had one.
    pub fn create_contact(&mut self, contact: Contact) -> Option<ContactId> {
        if self.get_contact_id(contact.collider_a, contact.collider_b).is_some() {
            return None;
        }
        let id = ContactId(self.next_id);
        self.next_id += 1;
        self.contacts.push((id, contact));
        Some(id)
    }

    pub fn get_contact_id(&self, a: ColliderHandle, b: ColliderHandle) -> Option<ContactId> {
        self.contacts
            .iter()
            .find(|(_, c)| c.matches(a, b))
            .map(|(id, _)| *id)
    }

    pub fn get_contact(&self, a: ColliderHandle, b: ColliderHandle) -> Option<&Contact> {
        self.contacts.iter().find(|(_, c)| c.matches(a, b)).map(|(_, c)| c)
    }

    pub fn get_contact_by_id(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|(cid, _)| *cid == id).map(|(_, c)| c)
    }

    pub fn destroy_contact(&mut self, a: ColliderHandle, b: ColliderHandle) -> Option<Contact> {
        let pos = self.contacts.iter().position(|(_, c)| c.matches(a, b))?;
        Some(self.contacts.remove(pos).1)
    }

    pub fn destroy_contact_by_id(&mut self, id: ContactId) -> Option<Contact> {
        let pos = self.contacts.iter().position(|(cid, _)| *cid == id)?;
        Some(self.contacts.remove(pos).1)
    }

    pub fn destroy_contacts(&mut self) {
        self.contacts.clear();
    }

    /// Call `begin_contact` for every active contact.
    pub fn apply_contacts(&self, listener: &mut dyn ContactListener) {
        for (_, contact) in &self.contacts {
            listener.begin_contact(contact);
        }
    }

    /// Call `end_contact` for every active contact.
    pub fn end_contacts(&self, listener: &mut dyn ContactListener) {
        for (_, contact) in &self.contacts {
            listener.end_contact(contact);
        }
    }

    /// Destroy every contact whose pair is not in `touching`, reporting each
    /// through `end_contact`. Returns how many contacts ended.
    pub fn retain_touching<L: ContactListener + ?Sized>(
        &mut self,
        touching: &HashSet<(ColliderHandle, ColliderHandle)>,
        listener: &mut L,
    ) -> usize {
        let before = self.contacts.len();
        self.contacts.retain(|(id, contact)| {
            if touching.contains(&contact.pair()) {
                return true;
            }
            debug!(?id, a = ?contact.collider_a, b = ?contact.collider_b, "contact ended");
            listener.end_contact(contact);
            false
        });
        before - self.contacts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles() -> (BodyHandle, Vec<ColliderHandle>) {
        let mut bodies = slotmap::SlotMap::<BodyHandle, ()>::with_key();
        let mut colliders = slotmap::SlotMap::<ColliderHandle, ()>::with_key();
        let body = bodies.insert(());
        (body, (0..4).map(|_| colliders.insert(())).collect())
    }

    fn contact(body: BodyHandle, a: ColliderHandle, b: ColliderHandle) -> Contact {
        Contact {
            collider_a: a,
            collider_b: b,
            body_a: body,
            body_b: body,
            a_key: None,
            b_key: None,
            sensor: false,
        }
    }

    #[test]
    fn test_create_is_symmetric_and_deduplicated() {
        let (body, c) = handles();
        let mut cm = ContactManager::new();
        let id = cm.create_contact(contact(body, c[0], c[1])).unwrap();
        assert!(cm.create_contact(contact(body, c[1], c[0])).is_none());
        assert_eq!(cm.len(), 1);
        assert_eq!(cm.get_contact_id(c[1], c[0]), Some(id));
        assert!(cm.get_contact(c[0], c[1]).is_some());
        assert_eq!(cm.get_contact_by_id(id).unwrap().collider_a, c[0]);
    }

    #[test]
    fn test_destroy_by_pair_and_id() {
        let (body, c) = handles();
        let mut cm = ContactManager::new();
        let first = cm.create_contact(contact(body, c[0], c[1])).unwrap();
        let second = cm.create_contact(contact(body, c[2], c[3])).unwrap();
        assert_ne!(first, second);

        assert!(cm.destroy_contact(c[1], c[0]).is_some());
        assert!(cm.get_contact(c[0], c[1]).is_none());
        assert!(cm.destroy_contact(c[0], c[1]).is_none());

        // Ids stay valid after other contacts are removed
        assert!(cm.get_contact_by_id(second).is_some());
        assert!(cm.destroy_contact_by_id(second).is_some());
        assert!(cm.get_contact_by_id(second).is_none());
        assert!(cm.is_empty());

        // Ids are never reused
        let third = cm.create_contact(contact(body, c[0], c[1])).unwrap();
        assert!(third != first && third != second);
    }

    #[test]
    fn test_apply_and_end_contacts_notify_listener() {
        let (body, c) = handles();
        let mut cm = ContactManager::new();
        cm.create_contact(contact(body, c[0], c[1]));
        cm.create_contact(contact(body, c[2], c[3]));
        let mut rec = ContactRecorder::new();
        cm.apply_contacts(&mut rec);
        cm.end_contacts(&mut rec);
        let evs = rec.drain();
        assert_eq!(evs.len(), 4);
        assert!(matches!(evs[0], ContactEvent::Begin(_)));
        assert!(matches!(evs[3], ContactEvent::End(_)));
        assert!(rec.events().is_empty());

        cm.destroy_contacts();
        assert!(cm.is_empty());
    }

    #[test]
    fn test_retain_touching_ends_only_lost_pairs() {
        let (body, c) = handles();
        let mut cm = ContactManager::new();
        cm.create_contact(contact(body, c[0], c[1]));
        cm.create_contact(contact(body, c[2], c[3]));
        let touching: HashSet<_> = [pair_key(c[1], c[0])].into_iter().collect();
        let mut rec = ContactRecorder::new();
        assert_eq!(cm.retain_touching(&touching, &mut rec), 1);
        assert_eq!(cm.len(), 1);
        match rec.events() {
            [ContactEvent::End(ended)] => assert!(ended.involves(c[2]) && ended.involves(c[3])),
            other => panic!("unexpected events {other:?}"),
        }
    }
}
