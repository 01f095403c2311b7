//! [`Query`] collection related to the multiple [`Unit`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Unit, read};

use super::DatabaseQuery;

/// Queries a list of [`Unit`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Unit>, read::unit::list::Filter>>;
