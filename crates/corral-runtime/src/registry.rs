use corral_panes::{LaunchRequest, Multiplexer, RestartRequest, lifecycle, try_discover_agents};
use corral_telemetry::{TailState, snapshot};
use corral_types::{LogSnapshot, PaneRecord, SessionEpoch, TailEvent};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::{Config, Error, LastSeen, Result};

/// A change published by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    AgentAdded {
        epoch: SessionEpoch,
    },
    AgentRemoved {
        key: String,
    },
    /// Same identity, different pane or log file
    AgentMoved {
        key: String,
        pane: PaneRecord,
        log_path: PathBuf,
    },
    /// Snapshot whose status, summary or lines differ from the last one
    Snapshot {
        key: String,
        snapshot: LogSnapshot,
    },
    Telemetry {
        key: String,
        event: TailEvent,
    },
    /// `old_key` no longer exists; `epoch` replaces it
    Restarted {
        old_key: String,
        epoch: SessionEpoch,
    },
}

/// Requests executed inside the registry loop, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCommand {
    Launch {
        working_directory: PathBuf,
        agent_type: String,
    },
    Restart {
        key: String,
        resume_id: Option<String>,
    },
    Kill {
        key: String,
    },
}

#[derive(Debug)]
struct Tracked {
    epoch: SessionEpoch,
    tail: Option<TailState>,
    snapshot: Option<LogSnapshot>,
}

impl Tracked {
    /// An agent found running; its log is tailed from the end on first poll.
    fn discovered(epoch: SessionEpoch) -> Self {
        Self {
            epoch,
            tail: None,
            snapshot: None,
        }
    }

    /// An agent this process started; its log is read from the first byte.
    fn started(epoch: SessionEpoch) -> Self {
        Self {
            tail: Some(TailState::from_start(epoch.log_path.clone())),
            epoch,
            snapshot: None,
        }
    }
}

fn same_content(a: &LogSnapshot, b: &LogSnapshot) -> bool {
    a.status == b.status && a.summary == b.summary && a.recent_lines == b.recent_lines
}

pub struct AgentRegistry {
    mux: Arc<dyn Multiplexer>,
    config: Config,
    agents: BTreeMap<String, Tracked>,
    last_seen: LastSeen,
}

impl AgentRegistry {
    pub fn new(mux: Arc<dyn Multiplexer>, config: Config) -> Self {
        Self {
            mux,
            config,
            agents: BTreeMap::new(),
            last_seen: LastSeen::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Current epochs, ordered by key.
    pub fn epochs(&self) -> impl Iterator<Item = &SessionEpoch> {
        self.agents.values().map(|tracked| &tracked.epoch)
    }

    pub fn epoch(&self, key: &str) -> Option<&SessionEpoch> {
        self.agents.get(key).map(|tracked| &tracked.epoch)
    }

    pub fn snapshot_of(&self, key: &str) -> Option<&LogSnapshot> {
        self.agents.get(key)?.snapshot.as_ref()
    }

    /// Byte offset of the agent's tail, once tailing has started.
    pub fn tail_offset(&self, key: &str) -> Option<u64> {
        self.agents.get(key)?.tail.as_ref().map(TailState::offset)
    }

    fn remove(&mut self, key: &str) -> Option<Tracked> {
        self.last_seen.forget(key);
        self.agents.remove(key)
    }

    /// Reconcile with the live panes and refresh every snapshot.
    ///
    /// A failed pane query leaves the registry untouched.
    pub async fn discover_tick(&mut self) -> Vec<RegistryEvent> {
        let found = match try_discover_agents(self.mux.as_ref(), &self.config.discovery()).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, "discovery failed, keeping known agents");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        let mut live = HashSet::new();

        for epoch in found {
            let key = epoch.key();
            live.insert(key.clone());

            match self.agents.get_mut(&key) {
                Some(tracked) => {
                    let relogged = tracked.epoch.log_path != epoch.log_path;
                    let moved = relogged || tracked.epoch.pane.target != epoch.pane.target;
                    if relogged {
                        tracked.tail = None;
                        tracked.snapshot = None;
                    }
                    if moved {
                        tracing::info!(key = %key, target = %epoch.pane.target, "agent moved");
                        events.push(RegistryEvent::AgentMoved {
                            key: key.clone(),
                            pane: epoch.pane.clone(),
                            log_path: epoch.log_path.clone(),
                        });
                    }
                    tracked.epoch = epoch;
                }
                None => {
                    tracing::info!(key = %key, target = %epoch.pane.target, "agent added");
                    events.push(RegistryEvent::AgentAdded {
                        epoch: epoch.clone(),
                    });
                    self.agents.insert(key, Tracked::discovered(epoch));
                }
            }
        }

        let gone: Vec<String> = self
            .agents
            .keys()
            .filter(|key| !live.contains(*key))
            .cloned()
            .collect();
        for key in gone {
            self.remove(&key);
            tracing::info!(key = %key, "agent removed");
            events.push(RegistryEvent::AgentRemoved { key });
        }

        events.extend(self.refresh_snapshots().await);
        events
    }

    async fn refresh_snapshots(&mut self) -> Vec<RegistryEvent> {
        let options = &self.config.snapshot;
        let fresh = join_all(
            self.agents
                .values()
                .map(|tracked| snapshot(tracked.epoch.log_path.clone(), options)),
        )
        .await;

        let mut events = Vec::new();
        for ((key, tracked), current) in self.agents.iter_mut().zip(fresh) {
            let changed = tracked
                .snapshot
                .as_ref()
                .is_none_or(|previous| !same_content(previous, &current));
            if changed {
                events.push(RegistryEvent::Snapshot {
                    key: key.clone(),
                    snapshot: current.clone(),
                });
            }
            tracked.snapshot = Some(current);
        }
        events
    }

    /// Poll every agent's log once. Repeated status and summary values are
    /// suppressed per agent.
    pub async fn tail_tick(&mut self) -> Vec<RegistryEvent> {
        let polls = self.agents.iter_mut().map(|(key, tracked)| async move {
            if tracked.tail.is_none() {
                tracked.tail = Some(TailState::open(tracked.epoch.log_path.clone()).await);
            }
            let mut events = Vec::new();
            let mut vanished = false;
            if let Some(tail) = tracked.tail.as_mut() {
                events = tail.poll().await;
                vanished = tail.is_vanished();
            }
            if vanished {
                tracing::debug!(key = %key, "log vanished, dropping tail state");
                tracked.tail = None;
            }
            (key.clone(), events)
        });
        let polled = join_all(polls).await;

        let mut out = Vec::new();
        for (key, events) in polled {
            for event in self.last_seen.filter(&key, events) {
                out.push(RegistryEvent::Telemetry {
                    key: key.clone(),
                    event,
                });
            }
        }
        out
    }

    /// Start a new agent and track it from the first byte of its log.
    pub async fn launch(
        &mut self,
        working_directory: PathBuf,
        agent_type: &str,
    ) -> Result<SessionEpoch> {
        let request = LaunchRequest {
            working_directory,
            agent_type: agent_type.to_string(),
            command: self.config.command_for(agent_type),
            log_dir: self.config.log_dir.clone(),
            scope: self.config.scope.clone(),
        };
        let epoch = lifecycle::launch(self.mux.as_ref(), &request).await?;
        self.agents.insert(epoch.key(), Tracked::started(epoch.clone()));
        Ok(epoch)
    }

    /// Restart agent `key` under a new session id.
    ///
    /// State for `key` is dropped before the pane is touched; on success the
    /// new epoch is tracked from offset 0 of its new log.
    pub async fn restart(&mut self, key: &str, resume_id: Option<String>) -> Result<SessionEpoch> {
        let agent_type = self
            .agents
            .get(key)
            .map(|tracked| tracked.epoch.identity.agent_type.clone())
            .ok_or_else(|| Error::UnknownAgent(key.to_string()))?;
        let request = RestartRequest {
            command: self.config.command_for(&agent_type),
            resume_id,
            scope: self.config.scope.clone(),
            settle: self.config.restart_settle(),
        };
        request.check(&agent_type)?;

        let old = self
            .remove(key)
            .ok_or_else(|| Error::UnknownAgent(key.to_string()))?
            .epoch;
        let epoch = lifecycle::restart(self.mux.as_ref(), &old, &request).await?;
        self.agents.insert(epoch.key(), Tracked::started(epoch.clone()));
        Ok(epoch)
    }

    pub async fn kill(&mut self, key: &str) -> Result<()> {
        let tracked = self
            .remove(key)
            .ok_or_else(|| Error::UnknownAgent(key.to_string()))?;
        lifecycle::kill(self.mux.as_ref(), &tracked.epoch).await?;
        Ok(())
    }

    /// Execute one command. Failures are logged; whatever state change did
    /// happen is still reported.
    pub async fn handle(&mut self, command: RegistryCommand) -> Vec<RegistryEvent> {
        match command {
            RegistryCommand::Launch {
                working_directory,
                agent_type,
            } => match self.launch(working_directory, &agent_type).await {
                Ok(epoch) => vec![RegistryEvent::AgentAdded { epoch }],
                Err(err) => {
                    tracing::warn!(agent_type = %agent_type, error = %err, "launch failed");
                    Vec::new()
                }
            },
            RegistryCommand::Restart { key, resume_id } => {
                let known = self.agents.contains_key(&key);
                match self.restart(&key, resume_id).await {
                    Ok(epoch) => vec![RegistryEvent::Restarted {
                        old_key: key,
                        epoch,
                    }],
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, "restart failed");
                        if known && !self.agents.contains_key(&key) {
                            vec![RegistryEvent::AgentRemoved { key }]
                        } else {
                            Vec::new()
                        }
                    }
                }
            }
            RegistryCommand::Kill { key } => {
                let known = self.agents.contains_key(&key);
                if let Err(err) = self.kill(&key).await {
                    tracing::warn!(key = %key, error = %err, "kill failed");
                }
                if known {
                    vec![RegistryEvent::AgentRemoved { key }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Drive discovery and tailing until `shutdown` turns true or its sender
    /// is dropped, publishing every change on `events`.
    pub async fn run(
        mut self,
        events: mpsc::Sender<RegistryEvent>,
        mut commands: mpsc::Receiver<RegistryCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut discovery = tokio::time::interval(self.config.discovery_interval());
        let mut tailing = tokio::time::interval(self.config.tail_interval());
        discovery.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tailing.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut commands_open = true;
        tracing::info!(
            log_dir = %self.config.log_dir.display(),
            scope = %self.config.scope,
            "registry started"
        );

        while !*shutdown.borrow() {
            let batch = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        commands_open = false;
                        continue;
                    }
                },
                _ = discovery.tick() => self.discover_tick().await,
                _ = tailing.tick() => self.tail_tick().await,
            };

            for event in batch {
                if events.send(event).await.is_err() {
                    tracing::debug!("event receiver dropped, stopping registry");
                    return;
                }
            }
        }

        tracing::info!("registry stopped");
    }
}
