//! Decision pass: run a policy over a device set and keep the writes.

use mdmsync_connector::Device;
use tracing::{debug, info};

use crate::policy::ReconcilePolicy;
use crate::statistics::RunStatistics;
use crate::types::Action;

/// A write the policy asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAction {
    pub device: Device,
    pub action: Action,
}

/// Writes planned for one device set, in collection order.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub actions: Vec<PlannedAction>,
    /// In-scope devices the policy saw.
    pub evaluated: u32,
    /// Devices outside the policy's scope.
    pub out_of_scope: u32,
    /// Evaluated devices that needed nothing.
    pub unchanged: u32,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// Applies one policy to devices.
pub struct Reconciler<'p> {
    policy: &'p dyn ReconcilePolicy,
}

impl<'p> Reconciler<'p> {
    pub fn new(policy: &'p dyn ReconcilePolicy) -> Self {
        Self { policy }
    }

    /// Decide every device independently. Devices the policy leaves alone
    /// are counted but not kept.
    pub fn plan<'d, I>(&self, devices: I) -> Plan
    where
        I: IntoIterator<Item = &'d Device>,
    {
        let mut plan = Plan::default();

        for device in devices {
            if !self.policy.applies_to(device) {
                plan.out_of_scope += 1;
                continue;
            }
            plan.evaluated += 1;

            match self.policy.decide(device) {
                Action::NoAction => plan.unchanged += 1,
                action => {
                    debug!(
                        policy = self.policy.name(),
                        device_id = device.id,
                        action = %action,
                        "Planned action"
                    );
                    plan.actions.push(PlannedAction {
                        device: device.clone(),
                        action,
                    });
                }
            }
        }

        info!(
            policy = self.policy.name(),
            evaluated = plan.evaluated,
            planned = plan.actions.len(),
            unchanged = plan.unchanged,
            "Reconciliation planned"
        );
        plan
    }

    /// Plan and fold the counts into `stats`.
    pub fn plan_into<'d, I>(&self, devices: I, stats: &mut RunStatistics) -> Plan
    where
        I: IntoIterator<Item = &'d Device>,
    {
        let plan = self.plan(devices);
        stats.devices_evaluated += plan.evaluated;
        stats.devices_out_of_scope += plan.out_of_scope;
        stats.devices_unchanged += plan.unchanged;
        for entry in &plan.actions {
            stats.record_planned(entry.action.kind());
        }
        plan
    }
}
