//! Change file to script, without a database.

use std::io::Write;

use schemaplan::prelude::*;

const CHANGES: &str = r#"[
    {
        "type": "add_table",
        "table": {
            "name": "posts",
            "columns": [
                { "name": "id", "type": { "integer": { "kind": "big_int", "unsigned": true } }, "nullable": false },
                { "name": "author_id", "type": { "integer": { "kind": "big_int", "unsigned": true } }, "nullable": false },
                {
                    "name": "created_at",
                    "type": { "timestamp": null },
                    "nullable": false,
                    "default": { "raw_expr": "CURRENT_TIMESTAMP" }
                }
            ],
            "primary_key": { "name": "PRIMARY", "parts": [ { "target": { "column": "id" } } ] },
            "foreign_keys": [
                {
                    "symbol": "fk_author",
                    "table": "posts",
                    "columns": ["author_id"],
                    "ref_table": { "name": "authors" },
                    "ref_columns": ["id"],
                    "on_delete": "cascade"
                }
            ]
        }
    },
    {
        "type": "add_table",
        "table": {
            "name": "authors",
            "columns": [
                { "name": "id", "type": { "integer": { "kind": "big_int", "unsigned": true } }, "nullable": false }
            ],
            "primary_key": { "name": "PRIMARY", "parts": [ { "target": { "column": "id" } } ] }
        }
    }
]"#;

async fn plan_file(json: &str, server: ServerInfo) -> Plan {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let changes = load_changes(file.path()).await.unwrap();
    MysqlPlanner::new(server)
        .plan_changes("pipeline", &changes)
        .unwrap()
}

#[tokio::test]
async fn test_forward_script() {
    let plan = plan_file(CHANGES, ServerInfo::default()).await;
    let script = render(&plan, Format::Sql).unwrap();
    assert_eq!(
        script,
        concat!(
            "-- create \"authors\" table\n",
            "CREATE TABLE `authors` (`id` bigint unsigned NOT NULL, PRIMARY KEY (`id`));\n",
            "-- create \"posts\" table\n",
            "CREATE TABLE `posts` (",
            "`id` bigint unsigned NOT NULL, ",
            "`author_id` bigint unsigned NOT NULL, ",
            "`created_at` timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP, ",
            "PRIMARY KEY (`id`), ",
            "CONSTRAINT `fk_author` FOREIGN KEY (`author_id`) REFERENCES `authors` (`id`) ON DELETE CASCADE",
            ");\n",
        )
    );
}

#[tokio::test]
async fn test_reverse_script() {
    let plan = plan_file(CHANGES, ServerInfo::default()).await;
    let script = render_reverse(&plan, Format::Sql).unwrap();
    assert_eq!(
        script,
        concat!(
            "-- reverse: create \"posts\" table\n",
            "DROP TABLE `posts`;\n",
            "-- reverse: create \"authors\" table\n",
            "DROP TABLE `authors`;\n",
        )
    );
}

#[tokio::test]
async fn test_irreversible_plan_has_no_reverse_script() {
    let json = r#"[
        {
            "type": "modify_table",
            "table": { "name": "posts" },
            "changes": [
                { "type": "drop_column", "column": { "name": "legacy", "type": "json" } }
            ]
        }
    ]"#;
    let plan = plan_file(json, ServerInfo::default()).await;
    assert!(!plan.reversible);
    assert!(matches!(
        render_reverse(&plan, Format::Json),
        Err(Error::NotReversible(_))
    ));
}

#[tokio::test]
async fn test_offline_mariadb_adds_json_check() {
    let json = r#"[
        {
            "type": "modify_table",
            "table": { "name": "posts" },
            "changes": [
                { "type": "add_column", "column": { "name": "meta", "type": "json", "nullable": true } }
            ]
        }
    ]"#;
    let server = offline(Some("5.5.5-10.2.44-MariaDB"), None, None).unwrap();
    let plan = plan_file(json, server).await;
    assert_eq!(
        plan.changes[0].cmd,
        "ALTER TABLE `posts` ADD COLUMN `meta` json NULL CHECK (json_valid(`meta`))"
    );
    assert_eq!(
        plan.changes[0].reverse.as_deref(),
        Some("ALTER TABLE `posts` DROP COLUMN `meta`")
    );
}
