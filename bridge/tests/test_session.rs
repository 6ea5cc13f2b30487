//! Tests for session operations over an in-memory peer

use std::sync::Mutex;

use async_trait::async_trait;
use ednbridge_core::reader::read;
use ednbridge_core::{
    Converter, ForeignValue, HostInput, HostValue, Peer, PeerError, Session, SessionError,
    TxInput,
};
use serde_json::json;

/// Records every request and answers with canned responses
#[derive(Default)]
struct MemoryPeer {
    transacted: Mutex<Vec<ForeignValue>>,
    queries: Mutex<Vec<(ForeignValue, Vec<ForeignValue>)>>,
    tx_response: Option<String>,
}

impl MemoryPeer {
    fn responding(tx_response: &str) -> Self {
        Self {
            tx_response: Some(tx_response.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Peer for MemoryPeer {
    async fn transact(&self, tx_data: ForeignValue) -> Result<ForeignValue, PeerError> {
        self.transacted.lock().unwrap().push(tx_data);
        let text = self.tx_response.as_deref().unwrap_or("{:tempids {}}");
        Ok(read(text)?)
    }

    async fn q(&self, query: ForeignValue, inputs: Vec<ForeignValue>) -> Result<ForeignValue, PeerError> {
        self.queries.lock().unwrap().push((query, inputs));
        Ok(read(r#"#{[17592186045418 "ahab"] [17592186045419 "ishmael"]}"#)?)
    }

    async fn pull(&self, pattern: ForeignValue, eid: ForeignValue) -> Result<ForeignValue, PeerError> {
        let keyword_ref = matches!(
            eid.elements(),
            Some([ForeignValue::Keyword(_), _])
        );
        Ok(ForeignValue::map(vec![
            (read(":pattern")?, pattern),
            (read(":eid")?, eid),
            (read(":keyword-ref")?, keyword_ref.into()),
        ]))
    }

    async fn entity_attr(&self, eid: ForeignValue, attr: ForeignValue) -> Result<ForeignValue, PeerError> {
        match (eid, attr.to_string().as_str()) {
            (ForeignValue::Long(17592186045418), ":user/roles") => {
                Ok(ForeignValue::hash_set(vec![read(":role/captain")?]))
            }
            (ForeignValue::Long(17592186045418), ":user/username") => Ok("ahab".into()),
            _ => Ok(ForeignValue::Nil),
        }
    }

    async fn datoms(
        &self,
        _index: ForeignValue,
        _components: Vec<ForeignValue>,
    ) -> Result<Vec<ForeignValue>, PeerError> {
        Ok(vec![
            read(r#"#datom [1 :user/username "ahab" 100 true]"#)?,
            read(r#"#datom [2 :user/username "ishmael" 100 true]"#)?,
        ])
    }
}

/// Every call fails with a connection error
struct FailingPeer;

#[derive(Debug)]
struct ConnectionLost;

impl std::fmt::Display for ConnectionLost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection lost")
    }
}

impl std::error::Error for ConnectionLost {}

#[async_trait]
impl Peer for FailingPeer {
    async fn transact(&self, _: ForeignValue) -> Result<ForeignValue, PeerError> {
        Err(Box::new(ConnectionLost))
    }

    async fn q(&self, _: ForeignValue, _: Vec<ForeignValue>) -> Result<ForeignValue, PeerError> {
        Err(Box::new(ConnectionLost))
    }

    async fn pull(&self, _: ForeignValue, _: ForeignValue) -> Result<ForeignValue, PeerError> {
        Err(Box::new(ConnectionLost))
    }

    async fn entity_attr(&self, _: ForeignValue, _: ForeignValue) -> Result<ForeignValue, PeerError> {
        Err(Box::new(ConnectionLost))
    }

    async fn datoms(&self, _: ForeignValue, _: Vec<ForeignValue>) -> Result<Vec<ForeignValue>, PeerError> {
        Err(Box::new(ConnectionLost))
    }
}

#[tokio::test]
async fn test_transact_payload_and_tempids() {
    let peer = MemoryPeer::responding(
        r#"{:tempids {"ahab" 17592186045418}
            :tx-data [#datom [13194139534313 :db/txInstant 0 13194139534313 true]
                      #datom [17592186045418 :user/username "ahab" 13194139534313 true]]}"#,
    );
    let session = Session::new(peer, Converter::new());

    let result = session
        .transact(TxInput::Payload(vec![
            json!({":db/id": "ahab", ":user/username": "ahab"}).into(),
        ]))
        .await
        .unwrap();

    assert_eq!(result.tempid("ahab"), Some(&json!(17592186045418i64)));
    assert_eq!(result.tx_data.len(), 2);
    assert_eq!(
        result.tx_data[1],
        json!([17592186045418i64, ":user/username", "ahab", 13194139534313i64, true])
    );

    let sent = session.peer().transacted.lock().unwrap();
    assert_eq!(sent[0].to_edn(), r#"[{:db/id "ahab", :user/username "ahab"}]"#);
}

#[tokio::test]
async fn test_transact_edn_text() {
    let session = Session::new(MemoryPeer::default(), Converter::new());
    let result = session
        .transact(TxInput::Edn(r#"[[:db/add "x" :user/age 3]]"#.to_string()))
        .await
        .unwrap();
    assert!(result.tempids.is_empty());
    assert!(result.tx_data.is_empty());
    assert_eq!(session.peer().transacted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_input_never_reaches_peer() {
    let session = Session::new(MemoryPeer::default(), Converter::new());

    let err = session
        .transact(TxInput::Edn("[[:db/add".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Read(_)));

    let err = session
        .transact(TxInput::Payload(vec!["not a tuple".into()]))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Payload(_)));

    assert!(session.peer().transacted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unexpected_commit_response() {
    let session = Session::new(MemoryPeer::responding("[1 2]"), Converter::new());
    let err = session
        .transact(TxInput::Edn("[]".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::UnexpectedResponse { operation: "transact", .. }
    ));

    let session = Session::new(MemoryPeer::responding("{:tempids [1]}"), Converter::new());
    let err = session
        .transact(TxInput::Edn("[]".to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(":tempids is not a map"));
}

#[tokio::test]
async fn test_query_converts_inputs_and_results() {
    let session = Session::new(MemoryPeer::default(), Converter::new());
    let result = session
        .q(
            "[:find ?e ?name :in $ ?min :where [?e :user/username ?name]]",
            &[HostInput::from(18i64)],
        )
        .await
        .unwrap();

    let HostValue::Array(rows) = &result else {
        panic!("expected array, got {}", result);
    };
    assert_eq!(rows.len(), 2);
    assert!(rows.contains(&json!([17592186045418i64, "ahab"])));
    assert!(rows.contains(&json!([17592186045419i64, "ishmael"])));

    let queries = session.peer().queries.lock().unwrap();
    assert_eq!(queries[0].1, vec![ForeignValue::Long(18)]);
    assert_eq!(queries[0].0.class_name(), Some("clojure.lang.PersistentVector"));
}

#[tokio::test]
async fn test_pull_keywordizes_lookup_ref() {
    let session = Session::new(MemoryPeer::default(), Converter::new());
    let result = session
        .pull("[:user/username]", &json!([":user/email", "ahab@pequod.org"]).into())
        .await
        .unwrap();
    assert_eq!(
        result,
        json!({
            ":pattern": [":user/username"],
            ":eid": [":user/email", "ahab@pequod.org"],
            ":keyword-ref": true
        })
    );
}

#[tokio::test]
async fn test_entity_attributes() {
    let session = Session::new(MemoryPeer::default(), Converter::new());
    let entity = session.entity(&HostInput::from(17592186045418i64)).unwrap();
    assert_eq!(entity.eid(), &ForeignValue::Long(17592186045418));
    assert_eq!(entity.get(":user/username").await.unwrap(), json!("ahab"));
    assert_eq!(entity.get(":user/roles").await.unwrap(), json!([":role/captain"]));
    assert_eq!(entity.get(":user/missing").await.unwrap(), json!(null));
}

#[tokio::test]
async fn test_datoms_iterate_as_host_arrays() {
    let session = Session::new(MemoryPeer::default(), Converter::new());
    let datoms = session.datoms(":eavt", &[":user/username"]).await.unwrap();
    assert_eq!(datoms.len(), 2);
    let names: Vec<_> = datoms.map(|d| d[2].clone()).collect();
    assert_eq!(names, vec![json!("ahab"), json!("ishmael")]);
}

#[tokio::test]
async fn test_peer_failure_propagates_unmodified() {
    use std::error::Error;

    let session = Session::new(FailingPeer, Converter::new());
    let err = session.q("[:find ?e]", &[]).await.unwrap_err();
    let SessionError::Peer(source) = &err else {
        panic!("expected peer error, got {:?}", err);
    };
    assert!(source.downcast_ref::<ConnectionLost>().is_some());
    assert_eq!(err.source().map(|s| s.to_string()), Some("connection lost".to_string()));

    assert!(matches!(
        session.transact(TxInput::Edn("[]".into())).await,
        Err(SessionError::Peer(_))
    ));
    assert!(matches!(
        session.datoms(":eavt", &[]).await,
        Err(SessionError::Peer(_))
    ));
}
