//! Longest-prefix routing: two hierarchies bound to different backends,
//! and `GROUP` on each selects the more specific one.

mod support;

use std::sync::Arc;

use support::{deliver, Client, Harness};

#[tokio::test]
async fn longest_prefix_selects_the_more_specific_backend() {
    let harness = Harness::with_hierarchies(&["sgug", "sgug.binaries"]).await;
    deliver(
        &harness.hierarchy_root("sgug"),
        "sgug.general",
        "1000.Ma",
        "Subject: A\r\nFrom: x@y\r\n\r\nbody\r\n",
    );
    deliver(
        &harness.hierarchy_root("sgug.binaries"),
        "sgug.binaries.test",
        "1000.Mb",
        "Subject: B\r\nFrom: x@y\r\n\r\nbody\r\n",
    );

    let (mut client, _) = Client::connect(Arc::clone(&harness.ctx)).await;

    client.send("GROUP sgug.binaries.test").await;
    assert_eq!(client.read_line().await, "211 1 1 1 sgug.binaries.test");

    client.send("GROUP sgug.general").await;
    assert_eq!(client.read_line().await, "211 1 1 1 sgug.general");
}

#[tokio::test]
async fn unrouted_hierarchy_is_no_such_group() {
    let harness = Harness::with_hierarchy("sgug.binaries").await;
    let (mut client, _) = Client::connect(Arc::clone(&harness.ctx)).await;

    client.send("GROUP comp.lang.rust").await;
    assert_eq!(client.read_line().await, "411 no such news group");
}
