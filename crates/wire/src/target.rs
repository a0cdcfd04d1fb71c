// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Metric domain requested by a SCRAPE command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Target {
    Jvm,
    #[serde(rename = "THREADPOOLS")]
    ThreadPools,
    Jdbc,
    Jca,
    Jms,
    Applications,
    Cluster,
    #[serde(rename = "HAMANAGER")]
    HaManager,
    DynamicCluster,
    Replication,
    ServletMetrics,
    EjbMetrics,
    JdbcAdvanced,
}

jx_core::simple_display! {
    Target {
        Jvm => "JVM",
        ThreadPools => "THREADPOOLS",
        Jdbc => "JDBC",
        Jca => "JCA",
        Jms => "JMS",
        Applications => "APPLICATIONS",
        Cluster => "CLUSTER",
        HaManager => "HAMANAGER",
        DynamicCluster => "DYNAMIC_CLUSTER",
        Replication => "REPLICATION",
        ServletMetrics => "SERVLET_METRICS",
        EjbMetrics => "EJB_METRICS",
        JdbcAdvanced => "JDBC_ADVANCED",
    }
}

impl Target {
    pub const ALL: [Target; 13] = [
        Target::Jvm,
        Target::ThreadPools,
        Target::Jdbc,
        Target::Jca,
        Target::Jms,
        Target::Applications,
        Target::Cluster,
        Target::HaManager,
        Target::DynamicCluster,
        Target::Replication,
        Target::ServletMetrics,
        Target::EjbMetrics,
        Target::JdbcAdvanced,
    ];

    /// Lower-case prefix used for flattened metric keys (`jvm`, `threadpools`, ...).
    pub fn metric_prefix(self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}
