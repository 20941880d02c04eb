mod common;

use anyhow::Result;
use common::WithSession;
use reqwest::header;
use serde_json::{json, Value};
use uuid::Uuid;

// Validation runs before any query, so these work against the offline server.

#[tokio::test]
async fn create_requires_category_amount_and_date() -> Result<()> {
    let server = common::offline_server().await?;
    let token = server.token_for(Uuid::new_v4());

    let (status, body) = common::json(
        server
            .post("/expenses")
            .bearer_auth(&token)
            .json(&json!({ "amount": 12.5, "date": "2024-03-01" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = common::json(
        server
            .post("/expenses")
            .bearer_auth(&token)
            .json(&json!({ "categoryId": "Food", "amount": -3, "date": "2024-03-01" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Amount must be greater than 0");

    // Values the NUMERIC(14, 2) column cannot hold are client errors
    for amount in [json!(0.001), json!("10000000000000")] {
        let res = server
            .post("/expenses")
            .bearer_auth(&token)
            .json(&json!({ "categoryId": "Food", "amount": amount, "date": "2024-03-01" }))
            .send()
            .await?;
        assert_eq!(res.status(), 400, "{}", amount);
    }
    Ok(())
}

#[tokio::test]
async fn list_rejects_unknown_sort_fields() -> Result<()> {
    let server = common::offline_server().await?;
    let token = server.token_for(Uuid::new_v4());

    for query in ["sortBy=description", "sortOrder=sideways", "page=0", "limit=abc", "startDate=yesterday"] {
        let res = server
            .get(&format!("/expenses?{}", query))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;
        assert_eq!(res.status(), 400, "{}", query);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_expense_ids_are_not_found() -> Result<()> {
    let server = common::offline_server().await?;
    let token = server.token_for(Uuid::new_v4());

    let (status, body) = common::json(server.delete("/expenses/42").bearer_auth(&token).send().await?).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Expense not found");
    Ok(())
}

async fn add_expense(server: &common::TestServer, session: &common::Session, body: Value) -> Result<Value> {
    let (status, body) = common::json(server.post("/expenses").session(session).json(&body).send().await?).await?;
    anyhow::ensure!(status == 201, "create expense failed: {} {}", status, body);
    Ok(body["expense"].clone())
}

#[tokio::test]
async fn listing_filters_sorts_and_paginates() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let ana = server.signup("Ana").await?;

    add_expense(&server, &ana, json!({"categoryId": "Food", "amount": 12.5, "date": "2024-03-01", "description": "Lunch"})).await?;
    add_expense(&server, &ana, json!({"categoryId": "Food", "amount": 40, "date": "2024-03-05", "description": "Groceries"})).await?;
    add_expense(&server, &ana, json!({"categoryId": "Transport", "amount": "7.25", "date": "2024-03-03", "description": "Bus pass"})).await?;

    // Expense JSON has exactly the public keys
    let (_, body) = common::json(server.get("/expenses").session(&ana).send().await?).await?;
    let first = body["expenses"][0].as_object().cloned().unwrap_or_default();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["amount", "category", "date", "description", "groupId", "id", "userId"]);
    assert_eq!(body["pagination"]["totalCount"], 3);

    // Default order: date descending
    let dates: Vec<&str> = body["expenses"].as_array().unwrap().iter().filter_map(|e| e["date"].as_str()).collect();
    assert_eq!(dates, ["2024-03-05", "2024-03-03", "2024-03-01"]);

    // Search spans description and category name
    let (_, body) = common::json(server.get("/expenses?search=trans").session(&ana).send().await?).await?;
    assert_eq!(body["pagination"]["totalCount"], 1);
    assert_eq!(body["expenses"][0]["category"], "Transport");

    // Category filter plus amount ascending
    let (_, body) =
        common::json(server.get("/expenses?category=Food&sortBy=amount&sortOrder=asc").session(&ana).send().await?).await?;
    let amounts: Vec<f64> = body["expenses"].as_array().unwrap().iter().filter_map(|e| e["amount"].as_f64()).collect();
    assert_eq!(amounts, [12.5, 40.0]);

    // Inclusive date range
    let (_, body) =
        common::json(server.get("/expenses?startDate=2024-03-03&endDate=2024-03-05").session(&ana).send().await?).await?;
    assert_eq!(body["pagination"]["totalCount"], 2);

    // Page past the end is empty but still reports totals
    let (status, body) = common::json(server.get("/expenses?page=3&limit=2").session(&ana).send().await?).await?;
    assert_eq!(status, 200);
    assert_eq!(body["expenses"], json!([]));
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPrevPage"], true);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_change_an_expense() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let ana = server.signup("Ana").await?;
    let ben = server.signup("Ben").await?;

    let expense = add_expense(&server, &ana, json!({"categoryId": "Rent", "amount": 900, "date": "2024-02-01"})).await?;
    let path = format!("/expenses/{}", expense["id"].as_str().unwrap_or_default());

    let (status, body) = common::json(server.put(&path).session(&ben).json(&json!({"amount": 1})).send().await?).await?;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Unauthorized to update this expense");

    let (status, _) = common::json(server.delete(&path).session(&ben).send().await?).await?;
    assert_eq!(status, 403);

    // Ben's listing never shows Ana's expense
    let (_, body) = common::json(server.get("/expenses").session(&ben).send().await?).await?;
    assert_eq!(body["pagination"]["totalCount"], 0);

    let (status, body) = common::json(
        server
            .put(&path)
            .session(&ana)
            .json(&json!({"amount": 950, "categoryId": "Housing"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(body["expense"]["amount"], 950.0);
    assert_eq!(body["expense"]["category"], "Housing");

    let (status, body) = common::json(server.delete(&path).session(&ana).send().await?).await?;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Expense deleted successfully");

    let (status, body) = common::json(server.delete(&path).session(&ana).send().await?).await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Expense not found");
    Ok(())
}

#[tokio::test]
async fn categories_are_shared_by_name() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let ana = server.signup("Ana").await?;
    let ben = server.signup("Ben").await?;
    let name = format!("Coffee Runs {}", Uuid::new_v4().simple());

    add_expense(&server, &ana, json!({"categoryId": name, "amount": 4.5, "date": "2024-04-01"})).await?;
    add_expense(&server, &ben, json!({"categoryId": name, "amount": 3, "date": "2024-04-02"})).await?;

    let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE name = $1")
        .bind(&name)
        .fetch_one(server.db.pool())
        .await?;
    assert_eq!(count, 1);

    // No description, so only the category name can match
    let (status, body) = common::json(server.get("/expenses?search=coffee").session(&ana).send().await?).await?;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["totalCount"], 1);
    assert_eq!(body["expenses"][0]["category"], name.as_str());
    assert_eq!(body["expenses"][0]["description"], "");
    Ok(())
}
