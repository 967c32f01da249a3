//! Process-wide interning of property sets.
//!
//! Shapes only carry a small [PropertiesId]. The content behind an id lives in the global
//! [PropertiesRepository]; equal sets always intern to the same id.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Mutex, OnceLock},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single property key or value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyValue {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

/// Key/value property set. Sets are ordered structurally (by their sorted content).
pub type PropertySet = BTreeMap<PropertyValue, PropertyValue>;

/// Identifier of an interned property set. [PropertiesId::NONE] is the empty set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PropertiesId(u32);

impl PropertiesId {
    pub const NONE: PropertiesId = PropertiesId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Intern `set` in the global repository.
    pub fn intern(set: PropertySet) -> Self {
        PropertiesRepository::with(|r| r.intern(set))
    }

    /// Content of the set behind this id.
    pub fn properties(self) -> PropertySet {
        PropertiesRepository::with(|r| r.get(self).clone())
    }

    /// Structural comparison of the sets behind two ids.
    pub fn cmp_content(self, other: PropertiesId) -> std::cmp::Ordering {
        if self == other {
            return std::cmp::Ordering::Equal;
        }
        PropertiesRepository::with(|r| r.get(self).cmp(r.get(other)))
    }

    /// The id of the structurally larger set of the two.
    pub fn max_content(self, other: PropertiesId) -> PropertiesId {
        if self.cmp_content(other) == std::cmp::Ordering::Less {
            other
        } else {
            self
        }
    }
}

impl fmt::Debug for PropertiesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interning table mapping property set content to ids.
#[derive(Debug)]
pub struct PropertiesRepository {
    sets: Vec<PropertySet>,
    ids: HashMap<PropertySet, PropertiesId>,
}

static REPOSITORY: OnceLock<Mutex<PropertiesRepository>> = OnceLock::new();

impl PropertiesRepository {
    fn new() -> Self {
        let empty = PropertySet::new();
        let mut ids = HashMap::new();
        ids.insert(empty.clone(), PropertiesId::NONE);
        PropertiesRepository {
            sets: vec![empty],
            ids,
        }
    }

    /// Run `f` with exclusive access to the global repository.
    pub fn with<R>(f: impl FnOnce(&mut PropertiesRepository) -> R) -> R {
        let m = REPOSITORY.get_or_init(|| Mutex::new(PropertiesRepository::new()));
        // a panic while holding the lock cannot leave the table half updated
        let mut guard = m.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn intern(&mut self, set: PropertySet) -> PropertiesId {
        if let Some(&id) = self.ids.get(&set) {
            return id;
        }
        let id = PropertiesId(self.sets.len() as u32);
        self.sets.push(set.clone());
        self.ids.insert(set, id);
        id
    }

    pub fn get(&self, id: PropertiesId) -> &PropertySet {
        &self.sets[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// A shape together with the id of its property set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WithProperties<S> {
    pub shape: S,
    pub prop_id: PropertiesId,
}

impl<S> WithProperties<S> {
    #[inline]
    pub fn new(shape: S, prop_id: PropertiesId) -> Self {
        WithProperties { shape, prop_id }
    }

    #[inline]
    pub fn plain(shape: S) -> Self {
        WithProperties {
            shape,
            prop_id: PropertiesId::NONE,
        }
    }

    /// Apply `f` to the shape, keeping the property id.
    #[inline]
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> WithProperties<T> {
        WithProperties {
            shape: f(self.shape),
            prop_id: self.prop_id,
        }
    }
}

impl<S> From<S> for WithProperties<S> {
    fn from(shape: S) -> Self {
        WithProperties::plain(shape)
    }
}

/// Build a property set from key/value pairs.
///
/// # Examples
///
/// ```
/// # use layout_regions::properties::*;
/// let a = PropertiesId::intern(property_set([("net", "VDD")]));
/// let b = PropertiesId::intern(property_set([("net", "VDD")]));
/// assert_eq!(a, b);
/// assert!(!a.is_none());
/// ```
pub fn property_set<K, V, I>(items: I) -> PropertySet
where
    K: Into<PropertyValue>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    items
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_ordering() {
        let a = PropertiesId::intern(property_set([("n", 1i64)]));
        let b = PropertiesId::intern(property_set([("n", 2i64)]));
        assert_eq!(a.max_content(b), b);
        assert_eq!(b.max_content(a), b);
        assert_eq!(PropertiesId::NONE.max_content(a), a);
        assert_eq!(b.properties().len(), 1);
    }
}
