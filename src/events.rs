use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted by the services after a successful write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    TableOpened { order_id: Uuid, table: i32 },
    OrderSent(Uuid),
    OrderFinished(Uuid),
    OrderDeleted(Uuid),
    ItemAdded { order_id: Uuid, product_id: Uuid, amount: i32 },
    ItemRemoved(Uuid),
    ReservationCreated(Uuid),
    ReservationConfirmed(Uuid),
    ReservationCancelled(Uuid),
    PermissionUpdated { role: String, route: String, can_access: bool },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }
}

/// Drains the event channel; events are currently only logged, but this is
/// the seam where kitchen displays or notification fan-out would hang off.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::TableOpened { order_id, table } => {
                info!(order_id = %order_id, table = table, "table opened");
            }
            Event::OrderSent(id) => info!(order_id = %id, "order sent to kitchen"),
            Event::OrderFinished(id) => info!(order_id = %id, "order finished"),
            Event::OrderDeleted(id) => info!(order_id = %id, "order deleted"),
            Event::ItemAdded {
                order_id,
                product_id,
                amount,
            } => {
                info!(order_id = %order_id, product_id = %product_id, amount = amount, "item added");
            }
            Event::ItemRemoved(id) => info!(item_id = %id, "item removed"),
            Event::ReservationCreated(id) => info!(reservation_id = %id, "reservation created"),
            Event::ReservationConfirmed(id) => info!(reservation_id = %id, "reservation confirmed"),
            Event::ReservationCancelled(id) => info!(reservation_id = %id, "reservation cancelled"),
            Event::PermissionUpdated {
                role,
                route,
                can_access,
            } => {
                info!(role = %role, route = %route, can_access = can_access, "permission updated");
            }
        }
    }
    info!("event channel closed, processor exiting");
}
