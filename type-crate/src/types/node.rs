use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MAX_NODES, MAX_POOLS_PER_NODE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeAssignmentError {
    #[error("invalid node pool assignment data, expected {MAX_NODES} nodes, found {0}")]
    InvalidLayout(usize),
    #[error("invalid node number {0}, must be between 1 and {MAX_NODES}")]
    InvalidNodeNumber(u64),
    #[error("pool app id 0 is not a valid pool")]
    InvalidPoolAppId,
    #[error("pool app id:{pool_app_id} already assigned to node number:{node_num}")]
    PoolAlreadyAssigned { pool_app_id: u64, node_num: u64 },
    #[error("node number:{0} is full")]
    NodeFull(u64),
    #[error("pool app id:{0} does not belong to this validator")]
    UnknownPool(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub pool_app_ids: Vec<u64>,
}

/// Pools hosted by each of a validator's nodes. Node numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolAssignmentConfig {
    pub nodes: Vec<NodeConfig>,
}

impl Default for NodePoolAssignmentConfig {
    fn default() -> Self {
        NodePoolAssignmentConfig {
            nodes: vec![NodeConfig::default(); MAX_NODES],
        }
    }
}

impl NodePoolAssignmentConfig {
    /// Assigns `pool_app_id` to node `node_num`. On error the config is left untouched.
    pub fn add_pool_to_node(
        &mut self,
        node_num: u64,
        pool_app_id: u64,
    ) -> Result<(), NodeAssignmentError> {
        self.check_node_num(node_num)?;
        if pool_app_id == 0 {
            return Err(NodeAssignmentError::InvalidPoolAppId);
        }
        if let Some(assigned_to) = self.node_for_pool(pool_app_id) {
            return Err(NodeAssignmentError::PoolAlreadyAssigned {
                pool_app_id,
                node_num: assigned_to,
            });
        }
        if !self.node_has_capacity(node_num)? {
            return Err(NodeAssignmentError::NodeFull(node_num));
        }

        self.nodes[node_index(node_num)].pool_app_ids.push(pool_app_id);
        Ok(())
    }

    /// Removes `pool_app_id` from whichever node holds it, returning that node number.
    pub fn remove_pool(&mut self, pool_app_id: u64) -> Option<u64> {
        let node_num = self.node_for_pool(pool_app_id)?;
        self.nodes[node_index(node_num)]
            .pool_app_ids
            .retain(|id| *id != pool_app_id);
        Some(node_num)
    }

    /// 1-based node number hosting `pool_app_id`, if any.
    pub fn node_for_pool(&self, pool_app_id: u64) -> Option<u64> {
        self.nodes
            .iter()
            .position(|node| node.pool_app_ids.contains(&pool_app_id))
            .map(|index| index as u64 + 1)
    }

    pub fn node_has_capacity(&self, node_num: u64) -> Result<bool, NodeAssignmentError> {
        self.check_node_num(node_num)?;
        Ok(self.nodes[node_index(node_num)].pool_app_ids.len() < MAX_POOLS_PER_NODE)
    }

    pub fn pools_on_node(&self, node_num: u64) -> Result<&[u64], NodeAssignmentError> {
        self.check_node_num(node_num)?;
        Ok(&self.nodes[node_index(node_num)].pool_app_ids)
    }

    fn check_node_num(&self, node_num: u64) -> Result<(), NodeAssignmentError> {
        if self.nodes.len() != MAX_NODES {
            return Err(NodeAssignmentError::InvalidLayout(self.nodes.len()));
        }
        if node_num == 0 || node_num > MAX_NODES as u64 {
            return Err(NodeAssignmentError::InvalidNodeNumber(node_num));
        }
        Ok(())
    }
}

fn node_index(node_num: u64) -> usize {
    node_num as usize - 1
}
