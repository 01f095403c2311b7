//! [`Query`] collection related to [`RentalHistory`] records.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::RentalHistory, read};

use super::DatabaseQuery;

/// Queries a list of [`RentalHistory`] records, newest first.
pub type List = DatabaseQuery<
    By<Vec<RentalHistory>, read::rental_history::list::Filter>,
>;
