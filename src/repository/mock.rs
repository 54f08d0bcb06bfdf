//! # Mock Repository
//!
//! A [`ResourceRepository`] that answers from a queue of expectations, for testing
//! the resolver and the assembler without a real store.
//!
//! ```ignore
//! let mock = MockRepository::new();
//! mock.expect_find_all_by_ids(["1", "2"]).return_ok(ResultSet::new(projects));
//!
//! let included = resolver.resolve_includes(&tasks, &spec).await?;
//! mock.verify(); // Ensures all expectations were met
//! ```

use crate::query::QuerySpec;
use crate::repository::{RepositoryError, ResourceRepository, ResultSet};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected call and the response to hand back.
enum Expectation {
    FindAll {
        response: Result<ResultSet, RepositoryError>,
    },
    FindAllByIds {
        ids: Vec<String>,
        response: Result<ResultSet, RepositoryError>,
    },
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

/// A repository with expectation tracking. Calls must arrive in the order the
/// expectations were set; anything else panics.
#[derive(Clone, Default)]
pub struct MockRepository {
    expectations: Expectations,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `find_all` call.
    pub fn expect_find_all(&self) -> FindAllExpectationBuilder {
        FindAllExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `find_all_by_ids` call with exactly `ids`. `find_one` lands here too.
    pub fn expect_find_all_by_ids<I, S>(&self, ids: I) -> FindAllByIdsExpectationBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FindAllByIdsExpectationBuilder {
            ids: ids.into_iter().map(Into::into).collect(),
            expectations: self.expectations.clone(),
        }
    }

    /// Names of the calls received so far, e.g. `find_all_by_ids(1,2)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().expect("mock expectations poisoned");
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, call: String) -> Option<Expectation> {
        self.calls.lock().expect("mock call log poisoned").push(call);
        self.expectations
            .lock()
            .expect("mock expectations poisoned")
            .pop_front()
    }
}

#[async_trait]
impl ResourceRepository for MockRepository {
    async fn find_all(&self, _spec: &QuerySpec) -> Result<ResultSet, RepositoryError> {
        match self.next("find_all".to_string()) {
            Some(Expectation::FindAll { response }) => response,
            _ => panic!("Unexpected find_all call or expectation mismatch"),
        }
    }

    async fn find_all_by_ids(&self, ids: &[String], _spec: &QuerySpec) -> Result<ResultSet, RepositoryError> {
        match self.next(format!("find_all_by_ids({})", ids.join(","))) {
            Some(Expectation::FindAllByIds { ids: expected, response }) => {
                assert_eq!(expected, ids, "find_all_by_ids called with unexpected ids");
                response
            }
            _ => panic!("Unexpected find_all_by_ids call or expectation mismatch"),
        }
    }
}

/// Builder for `find_all` expectations.
pub struct FindAllExpectationBuilder {
    expectations: Expectations,
}

impl FindAllExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, set: ResultSet) {
        self.push(Ok(set));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RepositoryError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<ResultSet, RepositoryError>) {
        let mut exps = self.expectations.lock().expect("mock expectations poisoned");
        exps.push_back(Expectation::FindAll { response });
    }
}

/// Builder for `find_all_by_ids` expectations.
pub struct FindAllByIdsExpectationBuilder {
    ids: Vec<String>,
    expectations: Expectations,
}

impl FindAllByIdsExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, set: ResultSet) {
        self.push(Ok(set));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RepositoryError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<ResultSet, RepositoryError>) {
        let mut exps = self.expectations.lock().expect("mock expectations poisoned");
        exps.push_back(Expectation::FindAllByIds {
            ids: self.ids,
            response,
        });
    }
}
