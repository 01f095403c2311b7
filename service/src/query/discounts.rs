//! [`Query`] collection related to the multiple [`Discount`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Discount, read};

use super::DatabaseQuery;

/// Queries a list of [`Discount`]s, newest first.
pub type List =
    DatabaseQuery<By<Vec<Discount>, read::discount::list::Filter>>;
