//! Builders for small simulator-shaped databases.

#![allow(dead_code)]

use simoracle_core::{Column, DataType, Database, FieldValue, Table};

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: i64,
    pub parent: i64,
    pub kind: &'static str,
    pub prototype: &'static str,
    pub enter_time: i64,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: i64,
    pub quantity: f64,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub sender: i64,
    pub receiver: i64,
    pub resource: i64,
    pub commodity: &'static str,
    pub time: i64,
}

#[derive(Debug, Clone)]
pub struct Exit {
    pub agent: i64,
    pub time: i64,
}

#[derive(Debug, Clone)]
pub struct Enrichment {
    pub agent: i64,
    pub resource: i64,
    pub swu: f64,
    pub time: i64,
}

/// One simulated run, written out the way the simulator would.
///
/// `AgentExit`, `Enrichments` and `SimulationTimeInfo` are only written
/// when the run has something to put in them.
#[derive(Debug, Clone)]
pub struct Run {
    pub sim_id: &'static str,
    pub agents: Vec<Agent>,
    pub resources: Vec<Resource>,
    pub transactions: Vec<Transaction>,
    pub exits: Vec<Exit>,
    pub enrichments: Vec<Enrichment>,
    pub decay_interval: Option<i64>,
    pub duration: i64,
}

pub fn agent(id: i64, parent: i64, prototype: &'static str) -> Agent {
    Agent {
        id,
        parent,
        kind: "Facility",
        prototype,
        enter_time: 0,
    }
}

impl Agent {
    pub fn kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    pub fn entered_at(mut self, time: i64) -> Self {
        self.enter_time = time;
        self
    }
}

pub fn resource(id: i64, quantity: f64) -> Resource {
    Resource { id, quantity }
}

pub fn transaction(
    id: i64,
    sender: i64,
    receiver: i64,
    resource: i64,
    commodity: &'static str,
    time: i64,
) -> Transaction {
    Transaction {
        id,
        sender,
        receiver,
        resource,
        commodity,
        time,
    }
}

pub fn exit(agent: i64, time: i64) -> Exit {
    Exit { agent, time }
}

pub fn enrichment(agent: i64, resource: i64, swu: f64, time: i64) -> Enrichment {
    Enrichment {
        agent,
        resource,
        swu,
        time,
    }
}

impl Run {
    pub fn new(sim_id: &'static str) -> Self {
        Self {
            sim_id,
            agents: Vec::new(),
            resources: Vec::new(),
            transactions: Vec::new(),
            exits: Vec::new(),
            enrichments: Vec::new(),
            decay_interval: None,
            duration: 10,
        }
    }

    pub fn agents(mut self, agents: Vec<Agent>) -> Self {
        self.agents = agents;
        self
    }

    pub fn resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }

    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn exits(mut self, exits: Vec<Exit>) -> Self {
        self.exits = exits;
        self
    }

    pub fn enrichments(mut self, enrichments: Vec<Enrichment>) -> Self {
        self.enrichments = enrichments;
        self
    }

    pub fn decay_interval(mut self, interval: i64) -> Self {
        self.decay_interval = Some(interval);
        self
    }

    pub fn database(&self) -> Database {
        let mut db = Database::new(self.sim_id)
            .with_table(self.agent_entry())
            .with_table(self.resources_table())
            .with_table(self.transactions_table())
            .with_table(self.info());
        if !self.exits.is_empty() {
            db = db.with_table(self.agent_exit());
        }
        if !self.enrichments.is_empty() {
            db = db.with_table(self.enrichments_table());
        }
        if let Some(interval) = self.decay_interval {
            db = db.with_table(self.simulation_time_info(interval));
        }
        db
    }

    fn sim(&self) -> FieldValue {
        FieldValue::from(self.sim_id)
    }

    pub fn agent_entry(&self) -> Table {
        let mut table = Table::new(
            "AgentEntry",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("AgentId", DataType::Int),
                Column::new("Kind", DataType::Text),
                Column::new("Spec", DataType::Text),
                Column::new("Prototype", DataType::Text),
                Column::new("ParentId", DataType::Int),
                Column::new("Lifetime", DataType::Int),
                Column::new("EnterTime", DataType::Int),
            ],
        );
        for a in &self.agents {
            table
                .push_row(vec![
                    self.sim(),
                    FieldValue::Int(a.id),
                    FieldValue::from(a.kind),
                    FieldValue::from(":agents:Source"),
                    FieldValue::from(a.prototype),
                    FieldValue::Int(a.parent),
                    FieldValue::Int(-1),
                    FieldValue::Int(a.enter_time),
                ])
                .unwrap();
        }
        table
    }

    pub fn resources_table(&self) -> Table {
        let mut table = Table::new(
            "Resources",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("ResourceId", DataType::Int),
                Column::new("Type", DataType::Text),
                Column::new("TimeCreated", DataType::Int),
                Column::new("Quantity", DataType::Float),
                Column::new("Units", DataType::Text),
            ],
        );
        for r in &self.resources {
            table
                .push_row(vec![
                    self.sim(),
                    FieldValue::Int(r.id),
                    FieldValue::from("Material"),
                    FieldValue::Int(0),
                    FieldValue::Float(r.quantity),
                    FieldValue::from("kg"),
                ])
                .unwrap();
        }
        table
    }

    pub fn transactions_table(&self) -> Table {
        let mut table = Table::new(
            "Transactions",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("TransactionId", DataType::Int),
                Column::new("SenderId", DataType::Int),
                Column::new("ReceiverId", DataType::Int),
                Column::new("ResourceId", DataType::Int),
                Column::new("Commodity", DataType::Text),
                Column::new("Time", DataType::Int),
            ],
        );
        for t in &self.transactions {
            table
                .push_row(vec![
                    self.sim(),
                    FieldValue::Int(t.id),
                    FieldValue::Int(t.sender),
                    FieldValue::Int(t.receiver),
                    FieldValue::Int(t.resource),
                    FieldValue::from(t.commodity),
                    FieldValue::Int(t.time),
                ])
                .unwrap();
        }
        table
    }

    pub fn agent_exit(&self) -> Table {
        let mut table = Table::new(
            "AgentExit",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("AgentId", DataType::Int),
                Column::new("ExitTime", DataType::Int),
            ],
        );
        for e in &self.exits {
            table
                .push_row(vec![self.sim(), FieldValue::Int(e.agent), FieldValue::Int(e.time)])
                .unwrap();
        }
        table
    }

    pub fn enrichments_table(&self) -> Table {
        let mut table = Table::new(
            "Enrichments",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("ResourceId", DataType::Int),
                Column::new("AgentId", DataType::Int),
                Column::new("Time", DataType::Int),
                Column::new("SWU", DataType::Float),
            ],
        );
        for e in &self.enrichments {
            table
                .push_row(vec![
                    self.sim(),
                    FieldValue::Int(e.resource),
                    FieldValue::Int(e.agent),
                    FieldValue::Int(e.time),
                    FieldValue::Float(e.swu),
                ])
                .unwrap();
        }
        table
    }

    pub fn simulation_time_info(&self, decay_interval: i64) -> Table {
        Table::new(
            "SimulationTimeInfo",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("InitialYear", DataType::Int),
                Column::new("InitialMonth", DataType::Int),
                Column::new("SimulationStart", DataType::Int),
                Column::new("Duration", DataType::Int),
                Column::new("DecayInterval", DataType::Int),
            ],
        )
        .with_row(vec![
            self.sim(),
            FieldValue::Int(2000),
            FieldValue::Int(1),
            FieldValue::Int(0),
            FieldValue::Int(self.duration),
            FieldValue::Int(decay_interval),
        ])
        .unwrap()
    }

    pub fn info(&self) -> Table {
        Table::new(
            "Info",
            vec![
                Column::new("SimId", DataType::Text),
                Column::new("InitialYear", DataType::Int),
                Column::new("InitialMonth", DataType::Int),
                Column::new("Duration", DataType::Int),
            ],
        )
        .with_row(vec![
            self.sim(),
            FieldValue::Int(2000),
            FieldValue::Int(1),
            FieldValue::Int(self.duration),
        ])
        .unwrap()
    }
}

/// A source feeding a sink, one transaction per step over three steps.
pub fn source_sink(sim_id: &'static str) -> Run {
    Run::new(sim_id)
        .agents(vec![agent(10, -1, "Region"), agent(11, 10, "Source"), agent(12, 10, "Sink")])
        .resources(vec![resource(100, 1.0), resource(101, 1.0), resource(102, 2.0)])
        .transactions(vec![
            transaction(0, 11, 12, 100, "fuel", 1),
            transaction(1, 11, 12, 101, "fuel", 2),
            transaction(2, 11, 12, 102, "fuel", 3),
        ])
}
