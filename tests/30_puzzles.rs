mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{READER, WRITER};

#[tokio::test]
async fn create_then_show() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/v1/puzzles"))
        .bearer_auth(server.token(WRITER))
        .json(&json!({"title": "Sudoku Classics", "num_of_puzzles": "120 puzzles", "genres": ["logic", "numbers"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers().get("location").unwrap().to_str()?.to_string();

    let body = res.json::<Value>().await?;
    let puzzle = &body["data"]["puzzle"];
    assert_eq!(location, format!("/v1/puzzles/{}", puzzle["id"]));
    assert_eq!(puzzle["version"], 1);
    assert_eq!(puzzle["num_of_puzzles"], "120 puzzles");

    let res = server
        .client
        .get(server.url(&location))
        .bearer_auth(server.token(READER))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let shown = res.json::<Value>().await?;
    assert_eq!(&shown["data"]["puzzle"], puzzle);
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_input() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);

    let res = server
        .client
        .post(server.url("/v1/puzzles"))
        .bearer_auth(&token)
        .json(&json!({"title": "", "num_of_puzzles": -3, "genres": ["a", "a"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["title"], "must be provided");
    assert_eq!(body["field_errors"]["num_of_puzzles"], "must be a positive integer");
    assert_eq!(body["field_errors"]["genres"], "must not contain duplicate values");

    let res = server
        .client
        .post(server.url("/v1/puzzles"))
        .bearer_auth(&token)
        .json(&json!({"title": "Odd", "num_of_puzzles": "many", "genres": ["logic"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/v1/puzzles"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn unparseable_or_missing_ids_are_404() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);

    for path in ["/v1/puzzles/abc", "/v1/puzzles/0", "/v1/puzzles/-1", "/v1/puzzles/999"] {
        let res = server.client.get(server.url(path)).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
    }

    let res = server
        .client
        .delete(server.url("/v1/puzzles/999"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_bumps_version_and_stale_version_conflicts() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);
    let puzzle = server
        .create_puzzle(json!({"title": "Crosswords", "num_of_puzzles": 30, "genres": ["words"]}))
        .await?;
    let path = format!("/v1/puzzles/{}", puzzle["id"]);

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({"title": "Crosswords Vol. 2", "version": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["data"]["puzzle"]["version"], 2);
    assert_eq!(updated["data"]["puzzle"]["title"], "Crosswords Vol. 2");
    // Fields absent from the patch are untouched
    assert_eq!(updated["data"]["puzzle"]["num_of_puzzles"], "30 puzzles");
    assert_eq!(updated["data"]["puzzle"]["genres"], json!(["words"]));

    // A second client still holding version 1
    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({"title": "Lost update", "version": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await?["code"], "EDIT_CONFLICT");

    let res = server.client.get(server.url(&path)).bearer_auth(&token).send().await?;
    let current = res.json::<Value>().await?;
    assert_eq!(current["data"]["puzzle"]["title"], "Crosswords Vol. 2");
    assert_eq!(current["data"]["puzzle"]["version"], 2);
    Ok(())
}

#[tokio::test]
async fn invalid_patch_leaves_record_unchanged() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);
    let puzzle = server
        .create_puzzle(json!({"title": "Nonograms", "num_of_puzzles": 12, "genres": ["logic"]}))
        .await?;
    let path = format!("/v1/puzzles/{}", puzzle["id"]);

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({"genres": []}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = server.client.get(server.url(&path)).bearer_auth(&token).send().await?;
    let current = res.json::<Value>().await?;
    assert_eq!(current["data"]["puzzle"]["version"], 1);
    assert_eq!(current["data"]["puzzle"]["genres"], json!(["logic"]));
    Ok(())
}

#[tokio::test]
async fn concurrent_patches_never_lose_updates() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);
    let puzzle = server
        .create_puzzle(json!({"title": "Kakuro", "num_of_puzzles": 5, "genres": ["numbers"]}))
        .await?;
    let path = format!("/v1/puzzles/{}", puzzle["id"]);

    let requests = (0..8).map(|i| {
        server
            .client
            .patch(server.url(&path))
            .bearer_auth(&token)
            .json(&json!({"num_of_puzzles": 100 + i}))
            .send()
    });
    let responses = futures::future::join_all(requests).await;

    let mut succeeded = 0;
    for res in responses {
        match res?.status() {
            StatusCode::OK => succeeded += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {}", other),
        }
    }
    assert!(succeeded >= 1);

    let res = server.client.get(server.url(&path)).bearer_auth(&token).send().await?;
    let current = res.json::<Value>().await?;
    assert_eq!(current["data"]["puzzle"]["version"], 1 + succeeded);
    Ok(())
}

#[tokio::test]
async fn delete_removes_puzzle() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);
    let puzzle = server
        .create_puzzle(json!({"title": "Mazes", "num_of_puzzles": 40, "genres": ["spatial"]}))
        .await?;
    let path = format!("/v1/puzzles/{}", puzzle["id"]);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["message"], "puzzle successfully deleted");

    let res = server.client.get(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({"title": "Ghost"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn patch_to_missing_puzzle_is_404_even_with_bad_body() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);

    let res = server
        .client
        .patch(server.url("/v1/puzzles/999"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{bad")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["code"], "NOT_FOUND");

    let puzzle = server
        .create_puzzle(json!({"title": "Tangrams", "num_of_puzzles": 7, "genres": ["spatial"]}))
        .await?;
    let res = server
        .client
        .patch(server.url(&format!("/v1/puzzles/{}", puzzle["id"])))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{bad")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn repeated_update_with_stale_version_conflicts() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token(WRITER);

    let puzzle = server
        .create_puzzle(json!({"title": "Foo", "num_of_puzzles": 3, "genres": ["a", "b"]}))
        .await?;
    assert_eq!(puzzle["id"], 1);
    assert_eq!(puzzle["version"], 1);

    let patch = json!({"genres": ["a", "b", "c"], "version": 1});
    let res = server
        .client
        .patch(server.url("/v1/puzzles/1"))
        .bearer_auth(&token)
        .json(&patch)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["puzzle"]["version"], 2);

    let res = server
        .client
        .patch(server.url("/v1/puzzles/1"))
        .bearer_auth(&token)
        .json(&patch)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}
