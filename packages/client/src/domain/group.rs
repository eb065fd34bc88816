//! Display groupings of backend servers.
//!
//! A [`ServerGroup`] is what the rendering surface shows: either one backend
//! server, or an aggregate whose counts are summed over several backends.
//! Groups come from configuration and never change once the monitor starts.

use serde::{Deserialize, Serialize};

use super::error::GroupError;
use super::snapshot::ServerId;

/// A named, ordered set of servers rendered as one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupDefinition", into = "GroupDefinition")]
pub struct ServerGroup {
    key: String,
    name: String,
    members: Vec<ServerId>,
    aggregate: bool,
}

impl ServerGroup {
    /// Create a group wrapping exactly one server
    pub fn single(key: impl Into<String>, name: impl Into<String>, member: ServerId) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            members: vec![member],
            aggregate: false,
        }
    }

    /// Create an aggregate group over several servers
    pub fn aggregate(
        key: impl Into<String>,
        name: impl Into<String>,
        members: Vec<ServerId>,
    ) -> Result<Self, GroupError> {
        let key = key.into();
        if members.is_empty() {
            return Err(GroupError::EmptyAggregate(key));
        }
        Ok(Self {
            key,
            name: name.into(),
            members,
            aggregate: true,
        })
    }

    /// Key the rendering surface uses for this group
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[ServerId] {
        &self.members
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    pub fn contains(&self, server: &ServerId) -> bool {
        self.members.contains(server)
    }
}

/// The serialized shape of a group, as found in a groups file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    pub members: Vec<String>,
    #[serde(default)]
    pub aggregate: bool,
}

impl TryFrom<GroupDefinition> for ServerGroup {
    type Error = GroupError;

    fn try_from(definition: GroupDefinition) -> Result<Self, Self::Error> {
        if definition.key.trim().is_empty() {
            return Err(GroupError::EmptyKey);
        }
        let name = definition.name.unwrap_or_else(|| definition.key.clone());
        if definition.members.iter().any(|member| member.trim().is_empty()) {
            return Err(GroupError::EmptyMember(definition.key));
        }
        let members: Vec<ServerId> = definition.members.into_iter().map(ServerId::new).collect();

        if definition.aggregate {
            return ServerGroup::aggregate(definition.key, name, members);
        }

        let mut members = members.into_iter();
        match (members.next(), members.next()) {
            (Some(member), None) => Ok(ServerGroup::single(definition.key, name, member)),
            (None, _) => Err(GroupError::SingleMemberRequired {
                key: definition.key,
                found: 0,
            }),
            (Some(_), Some(_)) => Err(GroupError::SingleMemberRequired {
                key: definition.key,
                found: 2 + members.count(),
            }),
        }
    }
}

impl From<ServerGroup> for GroupDefinition {
    fn from(group: ServerGroup) -> Self {
        Self {
            key: group.key,
            name: Some(group.name),
            members: group.members.into_iter().map(ServerId::into_string).collect(),
            aggregate: group.aggregate,
        }
    }
}

/// The built-in display layout: two aggregates followed by the individual servers
pub fn default_groups() -> Vec<ServerGroup> {
    let id = |raw: &str| ServerId::new(raw);
    let bedwars_family = vec![id("bedwars"), id("bedwars_solo"), id("bedwars_other")];
    let mut minigames = bedwars_family.clone();
    minigames.push(id("knockioffa"));

    vec![
        ServerGroup {
            key: "minigames_aggregate".to_string(),
            name: "Minigames (overview)".to_string(),
            members: minigames,
            aggregate: true,
        },
        ServerGroup {
            key: "bedwars_sub_aggregate".to_string(),
            name: "Bedwars (overview)".to_string(),
            members: bedwars_family,
            aggregate: true,
        },
        ServerGroup::single("bedwars", "Bedwars lobby", id("bedwars")),
        ServerGroup::single("bedwars_solo", "Bedwars (solo)", id("bedwars_solo")),
        ServerGroup::single("bedwars_other", "Bedwars (other)", id("bedwars_other")),
        ServerGroup::single("survival", "Survival", id("survival")),
        ServerGroup::single("lobby", "Minigames lobby", id("lobby")),
        ServerGroup::single("knockioffa", "Knockback FFA", id("knockioffa")),
    ]
}
