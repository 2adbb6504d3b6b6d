//! Concurrency behavior of per-area topology decisions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{Notify, Semaphore};

use isac_control::{
    next_topology, MemoryTopologyStore, TopologyController, TopologyDecision, TopologyPolicy,
    TopologyStore,
};
use isac_core::{AreaId, Result, Topology, TopologyState};

const THRESHOLD: f64 = 50.0;
const MARGIN: f64 = 10.0;

fn controller_with(store: Arc<dyn TopologyStore>) -> Arc<TopologyController> {
    Arc::new(TopologyController::new(TopologyPolicy::new(THRESHOLD, MARGIN).unwrap(), store).unwrap())
}

async fn decide_concurrently(
    controller: &Arc<TopologyController>,
    area: &AreaId,
    means: Vec<f64>,
) -> Vec<TopologyDecision> {
    let handles = means.into_iter().map(|mean| {
        let controller = controller.clone();
        let area = area.clone();
        tokio::spawn(async move { controller.decide(&area, mean).await.unwrap() })
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_area_decisions_do_not_lose_updates() {
    let controller = controller_with(Arc::new(MemoryTopologyStore::new()));
    let area = AreaId::new("room-101");
    let n = 64;

    let decisions = decide_concurrently(&controller, &area, vec![60.0; n]).await;

    // Only the first decision in the serial order can observe Monostatic
    assert_eq!(decisions.iter().filter(|d| d.topology_switched).count(), 1);

    let mut revisions: Vec<u64> = decisions.iter().map(|d| d.revision).collect();
    revisions.sort_unstable();
    assert_eq!(revisions, (1..=n as u64).collect::<Vec<_>>());

    let state = controller.state(&area).await.unwrap();
    assert_eq!(state.current, Topology::Multistatic);
    assert_eq!(state.revision, n as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_decisions_form_one_serial_history() {
    let controller = controller_with(Arc::new(MemoryTopologyStore::new()));
    let area = AreaId::new("room-101");
    let means: Vec<f64> = (0..50)
        .map(|i| match i % 3 {
            0 => 90.0,
            1 => 45.0,
            _ => 10.0,
        })
        .collect();

    let mut decisions = decide_concurrently(&controller, &area, means).await;
    decisions.sort_by_key(|d| d.revision);

    let mut expected = Topology::Monostatic;
    for d in &decisions {
        assert_eq!(d.previous, expected, "revision {} saw a stale state", d.revision);
        let next = next_topology(d.previous, d.mean_uncertainty, THRESHOLD, MARGIN);
        assert_eq!(d.current, next);
        assert_eq!(d.topology_switched, d.previous != d.current);
        expected = d.current;
    }

    assert_eq!(controller.current(&area).await.unwrap(), expected);
}

/// Store whose checkpoints for one area wait on a gate
struct GatedStore {
    inner: MemoryTopologyStore,
    gated_area: AreaId,
    entered: Notify,
    gate: Semaphore,
}

#[async_trait]
impl TopologyStore for GatedStore {
    async fn load(&self, area: &AreaId) -> Result<Option<TopologyState>> {
        self.inner.load(area).await
    }

    async fn save(&self, area: &AreaId, state: &TopologyState) -> Result<()> {
        if *area == self.gated_area {
            self.entered.notify_one();
            self.gate.acquire().await.unwrap().forget();
        }
        self.inner.save(area, state).await
    }

    async fn areas(&self) -> Result<Vec<AreaId>> {
        self.inner.areas().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pending_decision_blocks_only_its_own_area() {
    let busy = AreaId::new("room-101");
    let idle = AreaId::new("room-102");
    let store = Arc::new(GatedStore {
        inner: MemoryTopologyStore::new(),
        gated_area: busy.clone(),
        entered: Notify::new(),
        gate: Semaphore::new(0),
    });
    let controller = controller_with(store.clone());

    let first = {
        let controller = controller.clone();
        let busy = busy.clone();
        tokio::spawn(async move { controller.decide(&busy, 90.0).await })
    };
    store.entered.notified().await;

    // A different area proceeds while room-101 is mid-decision
    let other = tokio::time::timeout(Duration::from_secs(2), controller.decide(&idle, 90.0))
        .await
        .expect("independent area must not wait")
        .unwrap();
    assert!(other.topology_switched);

    // A second decision for the same area waits for the first
    let second = {
        let controller = controller.clone();
        let busy = busy.clone();
        tokio::spawn(async move { controller.decide(&busy, 10.0).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!second.is_finished());

    store.gate.add_permits(2);

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.revision, 1);
    assert_eq!(first.current, Topology::Multistatic);
    assert_eq!(second.revision, 2);
    assert_eq!(second.previous, Topology::Multistatic);
    assert_eq!(second.current, Topology::Monostatic);
}
