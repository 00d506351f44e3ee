#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::header;
    use axum::routing::get;
    use axum::Router;

    use crate::group::group::Group;
    use crate::group::loader::LoaderFn;
    use crate::group::peer::{FetchRequest, FetchResponse, PeerFetcher, PeerPicker};
    use crate::http::pool::{HttpFetcher, HttpPool};
    use crate::http::protocol::{
        decode_fetch_response, encode_fetch_response, escape_component, unescape_component,
        DEFAULT_BASE_PATH,
    };

    /// Serves the router on an ephemeral port and returns its address.
    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn echo_loader() -> impl crate::group::loader::Loader {
        LoaderFn::new(|key: String| async move { Ok(key.into_bytes()) })
    }

    // ============================================================
    // WIRE CODEC TESTS
    // ============================================================

    #[test]
    fn test_codec_roundtrip() {
        let response = FetchResponse { value: b"630".to_vec() };
        let encoded = encode_fetch_response(&response);

        // Tag (field 1, wire type 2), length, payload.
        assert_eq!(encoded, vec![0x0A, 0x03, b'6', b'3', b'0']);
        assert_eq!(decode_fetch_response(&encoded).unwrap(), response);
    }

    #[test]
    fn test_codec_roundtrip_empty_and_large() {
        let empty = FetchResponse::default();
        assert_eq!(
            decode_fetch_response(&encode_fetch_response(&empty)).unwrap(),
            empty
        );

        // Length crosses the single-byte varint boundary.
        let large = FetchResponse { value: vec![7u8; 300] };
        assert_eq!(
            decode_fetch_response(&encode_fetch_response(&large)).unwrap(),
            large
        );
    }

    #[test]
    fn test_decoder_skips_unknown_fields() {
        // Field 2 (varint 7) precedes the value field.
        let data = vec![0x10, 0x07, 0x0A, 0x02, b'h', b'i'];
        let response = decode_fetch_response(&data).unwrap();
        assert_eq!(response.value, b"hi");
    }

    #[test]
    fn test_decoder_rejects_truncated_record() {
        // Declared length 5, only one payload byte present.
        let data = vec![0x0A, 0x05, b'h'];
        assert!(decode_fetch_response(&data).is_err());
    }

    #[test]
    fn test_component_escaping_roundtrip() {
        for component in ["plain", "a b/c", "Łukasz", "100%", "a?b=c&d"] {
            let escaped = escape_component(component);
            assert!(!escaped.contains('/'), "escaped form of {component:?}");
            assert_eq!(unescape_component(&escaped).unwrap(), component);
        }
    }

    // ============================================================
    // SERVER HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_server_serves_cached_value() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let loader_invocations = invocations.clone();
        Group::new(
            "http-scores",
            1024,
            LoaderFn::new(move |key: String| {
                let invocations = loader_invocations.clone();
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    match key.as_str() {
                        "Tom" => Ok(b"630".to_vec()),
                        _ => anyhow::bail!("{key} not exist"),
                    }
                }
            }),
        );

        let addr = serve(crate::http::handlers::router(DEFAULT_BASE_PATH)).await;

        let response = reqwest::get(format!("http://{addr}/_peercache/http-scores/Tom"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        let body = response.bytes().await.unwrap();
        assert_eq!(decode_fetch_response(&body).unwrap().value, b"630");

        // Loader failures surface as 500 with the error text.
        let response = reqwest::get(format!("http://{addr}/_peercache/http-scores/Ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.text().await.unwrap(), "Ghost not exist");
    }

    #[tokio::test]
    async fn test_server_rejects_bad_paths() {
        let addr = serve(crate::http::handlers::router(DEFAULT_BASE_PATH)).await;

        // Suffix without a key part.
        let response = reqwest::get(format!("http://{addr}/_peercache/justagroup"))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        // Unknown group.
        let response = reqwest::get(format!("http://{addr}/_peercache/no-such-group/key"))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.text().await.unwrap(), "no such group: no-such-group");
    }

    #[tokio::test]
    async fn test_escaped_keys_survive_the_wire() {
        Group::new("http-echo", 1024, echo_loader());
        let addr = serve(crate::http::handlers::router(DEFAULT_BASE_PATH)).await;

        let fetcher = HttpFetcher::new(
            reqwest::Client::new(),
            format!("http://{addr}{DEFAULT_BASE_PATH}"),
        );
        let request = FetchRequest {
            group: "http-echo".to_string(),
            key: "a b/c".to_string(),
        };
        let response = fetcher.fetch(&request).await.unwrap();
        assert_eq!(response.value, b"a b/c");
    }

    // ============================================================
    // FETCHER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_fetcher_decodes_peer_response() {
        let hits = Arc::new(AtomicUsize::new(0));
        let route_hits = hits.clone();
        let app = Router::new().route(
            "/_peercache/scores/x",
            get(move || {
                let hits = route_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        [(header::CONTENT_TYPE, "application/octet-stream")],
                        encode_fetch_response(&FetchResponse { value: b"42".to_vec() }),
                    )
                }
            }),
        );
        let addr = serve(app).await;

        let fetcher = HttpFetcher::new(
            reqwest::Client::new(),
            format!("http://{addr}{DEFAULT_BASE_PATH}"),
        );
        let request = FetchRequest {
            group: "scores".to_string(),
            key: "x".to_string(),
        };
        let response = fetcher.fetch(&request).await.unwrap();

        assert_eq!(response.value, b"42");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetcher_reports_error_statuses() {
        let app = Router::new().route(
            "/_peercache/scores/x",
            get(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let addr = serve(app).await;

        let fetcher = HttpFetcher::new(
            reqwest::Client::new(),
            format!("http://{addr}{DEFAULT_BASE_PATH}"),
        );
        let request = FetchRequest {
            group: "scores".to_string(),
            key: "x".to_string(),
        };
        let error = fetcher.fetch(&request).await.unwrap_err();
        assert!(error.to_string().contains("500"), "{error}");
    }

    // ============================================================
    // PEER POOL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_pool_filters_self_and_agrees_with_peers() {
        let peer_a = "http://10.0.0.1:8001";
        let peer_b = "http://10.0.0.2:8001";

        let pool_a = HttpPool::new(peer_a);
        pool_a.set_peers([peer_a, peer_b]);
        let pool_b = HttpPool::new(peer_b);
        pool_b.set_peers([peer_a, peer_b]);

        let mut local_to_a = 0;
        let mut local_to_b = 0;
        for i in 0..1000 {
            let key = format!("key-{i}");
            let picked_a = pool_a.pick_peer(&key);
            let picked_b = pool_b.pick_peer(&key);

            // Kazdy klucz ma dokladnie jednego wlasciciela.
            assert_eq!(
                picked_a.is_none(),
                picked_b.is_some(),
                "pools disagree on owner of {key}"
            );
            if picked_a.is_none() {
                local_to_a += 1;
            } else {
                local_to_b += 1;
            }
        }

        // Both peers own a substantial share of the keyspace.
        assert!(local_to_a > 200, "peer A owns only {local_to_a} keys");
        assert!(local_to_b > 200, "peer B owns only {local_to_b} keys");
    }

    #[tokio::test]
    async fn test_empty_pool_always_serves_locally() {
        let pool = HttpPool::new("http://10.0.0.1:8001");
        assert!(pool.pick_peer("anything").is_none());
    }
}
