use common::{OrderId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use realtime::{Hub, PushMessage, Topic};

fn bench_publish_no_subscribers(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let hub = Hub::new();
    let topic = Topic::Order(OrderId::new());

    c.bench_function("realtime/publish_no_subscribers", |b| {
        b.iter(|| {
            rt.block_on(async { hub.publish(&topic, PushMessage::unread_count(0)).await });
        });
    });
}

fn bench_publish_100_sessions(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let hub = Hub::new();
    let topic = Topic::Order(OrderId::new());

    let mut sessions = rt.block_on(async {
        let mut sessions = Vec::with_capacity(100);
        for _ in 0..100 {
            let session = hub.connect(UserId::new()).await;
            hub.join(session.connection_id(), topic).await;
            sessions.push(session);
        }
        sessions
    });

    c.bench_function("realtime/publish_100_sessions", |b| {
        b.iter(|| {
            rt.block_on(async {
                let delivered = hub.publish(&topic, PushMessage::unread_count(1)).await;
                assert_eq!(delivered, 100);
                for session in &mut sessions {
                    session.try_recv();
                }
            });
        });
    });
}

fn bench_connect_join_disconnect(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let hub = Hub::new();
    let topic = Topic::Order(OrderId::new());

    c.bench_function("realtime/connect_join_disconnect", |b| {
        b.iter(|| {
            rt.block_on(async {
                let session = hub.connect(UserId::new()).await;
                hub.join(session.connection_id(), topic).await;
                hub.disconnect(session.connection_id()).await;
            });
        });
    });
}

criterion_group!(
    benches,
    bench_publish_no_subscribers,
    bench_publish_100_sessions,
    bench_connect_join_disconnect,
);
criterion_main!(benches);
