//! Discussions come over GraphQL rather than REST. The response is walked as
//! an untyped tree: a node missing any required field is dropped from the
//! result, it does not fail the whole list.

use super::error::Error;
use crate::types::Discussion;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub(super) const DISCUSSIONS_QUERY: &str = "\
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussions(first: 50, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        id
        number
        title
        body
        createdAt
        author { login }
        category { name }
        answer { id }
        comments { totalCount }
        upvoteCount
      }
    }
  }
}";

pub(super) fn discussions_payload(owner: &str, name: &str) -> Value {
    serde_json::json!({
        "query": DISCUSSIONS_QUERY,
        "variables": { "owner": owner, "name": name },
    })
}

pub(super) fn parse_discussions(body: &Value) -> Result<Vec<Discussion>, Error> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let msg = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Graphql(msg));
    }

    let nodes = body
        .pointer("/data/repository/discussions/nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Graphql("missing discussion nodes".to_owned()))?;

    let discussions = nodes.iter().filter_map(parse_node).collect();
    Ok(discussions)
}

fn parse_node(node: &Value) -> Option<Discussion> {
    let id = node.get("id")?.as_str()?.to_owned();
    let number = node.get("number")?.as_i64()?;
    let title = node.get("title")?.as_str()?.to_owned();
    let body = node.get("body")?.as_str()?.to_owned();
    let created_at = parse_datetime(node.get("createdAt")?.as_str()?)?;
    let author = node.pointer("/author/login")?.as_str()?.to_owned();
    let category = node.pointer("/category/name")?.as_str()?.to_owned();

    // Optional fields default rather than drop the node.
    let is_answered = node.get("answer").map(|x| !x.is_null()).unwrap_or(false);
    let comment_count =
        node.pointer("/comments/totalCount").and_then(Value::as_i64).unwrap_or(0);
    let upvote_count = node.get("upvoteCount").and_then(Value::as_i64).unwrap_or(0);

    Some(Discussion {
        id,
        number,
        title,
        body,
        author,
        created_at,
        category,
        is_answered,
        comment_count,
        upvote_count,
    })
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str) -> Value {
        json!({
            "id": id,
            "number": 7,
            "title": "Roadmap",
            "body": "What's next?",
            "createdAt": "2025-10-27T21:00:00Z",
            "author": { "login": "mlf" },
            "category": { "name": "General" },
            "answer": null,
            "comments": { "totalCount": 4 },
            "upvoteCount": 2,
        })
    }

    fn envelope(nodes: Vec<Value>) -> Value {
        json!({ "data": { "repository": { "discussions": { "nodes": nodes } } } })
    }

    #[test]
    fn test_parse_well_formed_node() {
        let discussions = parse_discussions(&envelope(vec![node("D_1")])).unwrap();
        assert_eq!(discussions.len(), 1);
        let d = &discussions[0];
        assert_eq!(d.id, "D_1");
        assert_eq!(d.number, 7);
        assert_eq!(d.author, "mlf");
        assert_eq!(d.category, "General");
        assert!(!d.is_answered);
        assert_eq!(d.comment_count, 4);
        assert_eq!(d.upvote_count, 2);
    }

    #[test]
    fn test_answered_flag() {
        let mut answered = node("D_1");
        answered["answer"] = json!({ "id": "DA_1" });
        let discussions = parse_discussions(&envelope(vec![answered])).unwrap();
        assert!(discussions[0].is_answered);
    }

    #[test]
    fn test_malformed_node_is_dropped() {
        let mut missing_category = node("D_2");
        missing_category.as_object_mut().unwrap().remove("category");
        let discussions =
            parse_discussions(&envelope(vec![node("D_1"), missing_category, node("D_3")]))
                .unwrap();
        let ids: Vec<_> = discussions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["D_1", "D_3"]);
    }

    #[test]
    fn test_errors_envelope() {
        let body = json!({ "errors": [{ "message": "bad credentials" }] });
        let err = parse_discussions(&body).unwrap_err();
        assert_eq!(err.to_string(), "graphql response: bad credentials");
    }

    #[test]
    fn test_missing_data_tree() {
        let err = parse_discussions(&json!({ "data": {} })).unwrap_err();
        assert!(matches!(err, Error::Graphql(_)));
    }
}
