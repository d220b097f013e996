//! Serde support: a `PowerList` serializes as a sorted sequence.
//!
//! Deserialization goes through the bulk builder, so the result is balanced and an
//! unsorted sequence is rejected instead of silently reordered.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, Error as _, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::PowerList;

impl<T: Serialize> Serialize for PowerList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

struct PowerListVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for PowerListVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = PowerList<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sorted sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        PowerList::from_sorted(values).map_err(A::Error::custom)
    }
}

impl<'de, T> Deserialize<'de> for PowerList<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(PowerListVisitor { marker: PhantomData })
    }
}
