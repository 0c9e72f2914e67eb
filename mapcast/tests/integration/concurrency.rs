use std::thread;

use mapcast::{Decode, Decoder, Value, map};
use mapcast_testhelpers::test;

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Job {
    pub id: u64,
    #[mapcast(schema = "job_name", default = "anonymous")]
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Decode)]
struct Batch {
    pub jobs: Vec<Job>,
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn decoder_is_shareable() {
    assert_send_sync::<Decoder>();
}

#[test]
fn concurrent_decodes_agree() {
    let decoder = Decoder::default();

    thread::scope(|scope| {
        for worker in 0..8_u64 {
            let decoder = &decoder;
            scope.spawn(move || {
                for round in 0..100_u64 {
                    let id = worker * 1000 + round;
                    let job: Job = decoder
                        .from_map(&map! {
                            "id" => id.to_string(),
                            "tags" => vec![Value::from("t"), Value::from(round)],
                        })
                        .unwrap();
                    assert_eq!(
                        job,
                        Job {
                            id,
                            name: "anonymous".into(),
                            tags: vec!["t".into(), round.to_string()],
                        }
                    );
                }
            });
        }
    });

    // one descriptor per record type, however many threads raced to build it
    assert_eq!(decoder.cache().len(), 1);
}

#[test]
fn clones_share_the_cache() {
    let decoder = Decoder::default();
    let clone = decoder.clone();

    thread::scope(|scope| {
        scope.spawn(|| {
            let batch: Batch = clone
                .from_map(&map! { "jobs" => vec![Value::from(map! { "id" => 1 })] })
                .unwrap();
            assert_eq!(batch.jobs[0].id, 1);
        });
    });

    assert_eq!(decoder.cache().len(), 2);
}
