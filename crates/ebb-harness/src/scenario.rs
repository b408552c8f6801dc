//! Scenario definitions and expected outcomes.
//!
//! A [`Scenario`] describes one topology-and-policy combination; its
//! [`Scenario::expectations`] derive which tables must survive and which
//! must be purged from EbbDB's documented retention contract:
//!
//! 1. a table is purge-eligible once `now >= anchor + ttl`, where the
//!    anchor is the later of creation time and last flushed write;
//! 2. TTL 0 (or unset with no database default) never purges;
//! 3. the database-level TTL is the default for tables created without
//!    their own; a table-level TTL always wins;
//! 4. super tables are never purged by TTL;
//! 5. a table with WAL-pending writes is never purged until flushed;
//! 6. `ALTER TABLE ... TTL` re-arms the policy and never drops at alter
//!    time.
//!
//! The derivation lives here, in one place, so no per-test expectation
//! can drift from the contract.

use serde::{Deserialize, Serialize};

use ebb_common::constants::{CHILD_PREFIX, NORMAL_PREFIX, SUPER_PREFIX};
use ebb_common::{RunConfig, TableClass};

/// How WAL-pending writes are flushed before the expiry wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlushMode {
    /// Leave writes WAL-pending.
    None,
    /// Issue `FLUSH DATABASE` through the SQL collaborator.
    Statement,
    /// Restart the deployment through the cluster collaborator.
    Restart,
}

/// Which tables a scenario creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Create one super table (`stb1`).
    pub super_table: bool,
    /// Number of child tables under the super table.
    pub children: usize,
    /// Number of independent normal tables.
    pub normals: usize,
    /// Table-level TTL for every child, overriding the database default.
    pub child_ttl: Option<u32>,
    /// Table-level TTL for every normal table.
    pub normal_ttl: Option<u32>,
}

impl TopologySpec {
    /// A lone super table.
    #[must_use]
    pub fn super_only() -> Self {
        Self { super_table: true, children: 0, normals: 0, child_ttl: None, normal_ttl: None }
    }

    /// One super table with `children` children.
    #[must_use]
    pub fn super_with_children(children: usize) -> Self {
        Self { super_table: true, children, normals: 0, child_ttl: None, normal_ttl: None }
    }

    /// Normal tables only.
    #[must_use]
    pub fn normals_only(normals: usize) -> Self {
        Self { super_table: false, children: 0, normals, child_ttl: None, normal_ttl: None }
    }

    /// One super table with children plus normal tables.
    #[must_use]
    pub fn mixed(children: usize, normals: usize) -> Self {
        Self { super_table: true, children, normals, child_ttl: None, normal_ttl: None }
    }

    /// Sets the normal-table TTL override.
    #[must_use]
    pub fn with_normal_ttl(mut self, ttl: u32) -> Self {
        self.normal_ttl = Some(ttl);
        self
    }
}

/// Expected post-expiry state of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// The table must still exist, with the given row count if known.
    Present {
        /// Expected row count, when the scenario populated the table.
        rows: Option<u64>,
    },
    /// The table must have been removed by the expiry sweep.
    Purged,
}

/// One table's expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableExpectation {
    /// Table name within the scenario database.
    pub name: String,
    /// The table's class.
    pub class: TableClass,
    /// Expected state after the expiry wait.
    pub expectation: Expectation,
}

/// One topology-and-policy combination to validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, used in reports and assertion failures.
    pub name: String,
    /// Database-level TTL, if any.
    pub database_ttl: Option<u32>,
    /// Tables to create.
    pub topology: TopologySpec,
    /// Rows to insert per child/normal table; 0 leaves tables empty to
    /// exercise TTL on table metadata alone.
    pub rows: usize,
    /// Whether and how WAL-pending writes are flushed before the wait.
    pub flush: FlushMode,
    /// TTL applied to every child/normal table via `ALTER TABLE` after
    /// creation (and after any inserts).
    pub alter_ttl: Option<u32>,
}

impl Scenario {
    /// The full scenario matrix for one run.
    #[must_use]
    pub fn suite(config: &RunConfig) -> Vec<Scenario> {
        let children = config.child_count;
        let normals = config.normal_count;
        let rows = config.rows;
        vec![
            Scenario {
                name: "super_only".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::super_only(),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "super_children_empty".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::super_with_children(children),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "normals_empty".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::normals_only(normals.max(1)),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "mixed_empty".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::mixed(children, normals.max(1)),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "children_wal_pending".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::super_with_children(children),
                rows,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "children_flushed_purge".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::super_with_children(children),
                rows,
                flush: FlushMode::Statement,
                alter_ttl: None,
            },
            Scenario {
                name: "restart_flushes_wal".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::mixed(children, normals.max(1)),
                rows,
                flush: FlushMode::Restart,
                alter_ttl: None,
            },
            Scenario {
                name: "normal_override_survives".to_string(),
                database_ttl: Some(1),
                topology: TopologySpec::mixed(children, normals.max(1)).with_normal_ttl(0),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: None,
            },
            Scenario {
                name: "alter_ttl_rearm".to_string(),
                database_ttl: None,
                topology: TopologySpec::super_with_children(children),
                rows: 0,
                flush: FlushMode::None,
                alter_ttl: Some(1),
            },
        ]
    }

    /// True when the scenario's writes stay WAL-pending through the
    /// expiry wait.
    #[must_use]
    pub fn wal_pending(&self) -> bool {
        self.rows > 0 && self.flush == FlushMode::None
    }

    /// The largest effective TTL any table in the scenario carries, used
    /// to size the expiry wait.
    #[must_use]
    pub fn max_ttl(&self) -> u32 {
        let child = self.effective_ttl(self.topology.child_ttl);
        let normal = self.effective_ttl(self.topology.normal_ttl);
        child.max(normal)
    }

    /// Every created table's name, class, and expected post-expiry state.
    #[must_use]
    pub fn expectations(&self) -> Vec<TableExpectation> {
        let mut expected = Vec::new();
        if self.topology.super_table {
            // Contract rule 4: TTL never removes a super table.
            expected.push(TableExpectation {
                name: format!("{SUPER_PREFIX}1"),
                class: TableClass::Super,
                expectation: Expectation::Present { rows: None },
            });
        }
        for i in 1..=self.topology.children {
            expected.push(TableExpectation {
                name: format!("{CHILD_PREFIX}{i}"),
                class: TableClass::Child,
                expectation: self.leaf_expectation(self.topology.child_ttl),
            });
        }
        for i in 1..=self.topology.normals {
            expected.push(TableExpectation {
                name: format!("{NORMAL_PREFIX}{i}"),
                class: TableClass::Normal,
                expectation: self.leaf_expectation(self.topology.normal_ttl),
            });
        }
        expected
    }

    /// Effective TTL for a child/normal table: the latest `ALTER` wins,
    /// then the table-level override, then the database default.
    fn effective_ttl(&self, table_ttl: Option<u32>) -> u32 {
        self.alter_ttl
            .or(table_ttl)
            .or(self.database_ttl)
            .unwrap_or(0)
    }

    fn leaf_expectation(&self, table_ttl: Option<u32>) -> Expectation {
        let ttl = self.effective_ttl(table_ttl);
        let retained_rows = if self.rows > 0 { Some(self.rows as u64) } else { None };
        if ttl == 0 || self.wal_pending() {
            Expectation::Present { rows: retained_rows }
        } else {
            Expectation::Purged
        }
    }
}
