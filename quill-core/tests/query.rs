#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill_core::{
        CompileError, Config, Filter, GenericDialect, JoinKind, Method, Operator, Order,
        QueryBuilder, Raw, Value, count_placeholders, record,
    };
    use std::{str::FromStr, time::Duration};

    const DIALECT: GenericDialect = GenericDialect;

    fn sql(query: &QueryBuilder) -> String {
        query
            .compile(&DIALECT)
            .expect("Could not compile the query")
            .sql
    }

    #[test]
    fn select_components_order() {
        let query = QueryBuilder::table("users")
            .limit(10)
            .order_by("name", Order::Desc)
            .where_("id", 1)
            .select(["id", "name"])
            .offset(5);
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                select "id", "name" from "users" where "id" = ? order by "name" desc limit ? offset ?
            "#}
            .trim()
        );
        assert_eq!(
            statement.bindings,
            [Value::Int(1), Value::Int(10), Value::Int(5)]
        );
        assert_eq!(statement.method, Method::Select);
    }

    #[test]
    fn select_star() {
        assert_eq!(sql(&QueryBuilder::table("users")), "select * from \"users\"");
        assert_eq!(
            sql(&QueryBuilder::table("users").distinct(["role"])),
            "select distinct \"role\" from \"users\""
        );
        assert_eq!(
            sql(&QueryBuilder::table("users").first(["id"])),
            "select \"id\" from \"users\" limit ?"
        );
    }

    #[test]
    fn pending_modifiers_apply_once() {
        let query = QueryBuilder::table("t")
            .where_("a", 1)
            .or()
            .where_("b", 2)
            .where_("c", 3)
            .not()
            .where_("d", 4)
            .where_("e", 5);
        assert_eq!(
            sql(&query),
            r#"select * from "t" where "a" = ? or "b" = ? and "c" = ? and not "d" = ? and "e" = ?"#
        );
        let query = QueryBuilder::table("t")
            .where_null("a")
            .where_not_null("b")
            .or()
            .not()
            .where_in("c", [1, 2])
            .where_in("d", Vec::<i32>::new());
        assert_eq!(
            sql(&query),
            r#"select * from "t" where "a" is null and "b" is not null or "c" not in (?, ?) and 1 = 0"#
        );
    }

    #[test]
    fn where_shapes() {
        let query = QueryBuilder::table("users")
            .where_between("age", (18, 30))
            .where_op("name", Operator::from_str("like").expect("Valid operator"), "a%")
            .where_("deleted_at", Value::Null)
            .where_column("users.id", Operator::GreaterEqual, "users.parent_id")
            .where_group(|q| q.where_("x", 1).or().where_("y", 2))
            .where_in_query("id", QueryBuilder::table("orders").select(["user_id"]))
            .where_exists(QueryBuilder::table("bans").where_raw("bans.user_id = users.id"))
            .where_raw(Raw::new("score > ?").bind(7));
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                select * from "users"
                where "age" between ? and ?
                and "name" like ?
                and "deleted_at" is null
                and "users"."id" >= "users"."parent_id"
                and ("x" = ? or "y" = ?)
                and "id" in (select "user_id" from "orders")
                and exists (select * from "bans" where bans.user_id = users.id)
                and score > ?
            "#}
            .trim()
            .replace('\n', " ")
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Int(18),
                Value::Int(30),
                Value::Text("a%".into()),
                Value::Int(1),
                Value::Int(2),
                Value::Int(7),
            ]
        );
    }

    #[test]
    fn joins_groups_unions() {
        let query = QueryBuilder::table("users")
            .select(["users.role"])
            .count("users.id as total")
            .join("orders", "users.id", Operator::Equal, "orders.user_id")
            .join_on(JoinKind::Left, "teams", |j| {
                j.on("teams.id", Operator::Equal, "users.team_id")
                    .or_on_val("teams.open", Operator::Equal, true)
            })
            .group_by(["users.role"])
            .having("total", Operator::Greater, 3)
            .union_all(QueryBuilder::table("admins").select(["role"]).count("id"));
        assert_eq!(
            sql(&query),
            indoc! {r#"
                select "users"."role", count("users"."id") as "total" from "users"
                inner join "orders" on "users"."id" = "orders"."user_id"
                left join "teams" on "teams"."id" = "users"."team_id" or "teams"."open" = ?
                union all select "role", count("id") from "admins"
                group by "users"."role"
                having "total" > ?
            "#}
            .trim()
            .replace('\n', " ")
        );
    }

    #[test]
    fn with_clause() {
        let query = QueryBuilder::table("active")
            .with("active", QueryBuilder::table("users").where_("active", true))
            .with_raw("ids", Raw::new("select ? as id").bind(1));
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"with "active" as (select * from "users" where "active" = ?), "ids" as (select ? as id) select * from "active""#
        );
        assert_eq!(statement.bindings, [Value::Boolean(true), Value::Int(1)]);
    }

    #[test]
    fn insert_rows() {
        let query = QueryBuilder::table("users").insert_many([
            record! { "a" => 1, "b" => 2 },
            record! { "a" => 3 },
        ]);
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"insert into "users" ("a", "b") values (?, ?), (?, DEFAULT)"#
        );
        assert_eq!(
            statement.bindings,
            [Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        let config = Config::new().use_null_as_default(true);
        assert_eq!(
            query
                .compile_with(&DIALECT, &config)
                .expect("Could not compile the query")
                .sql,
            r#"insert into "users" ("a", "b") values (?, ?), (?, NULL)"#
        );
        assert_eq!(
            sql(&QueryBuilder::table("users").insert(record! {})),
            r#"insert into "users" default values"#
        );
        let statement = QueryBuilder::table("users")
            .insert(record! { "name" => "x" })
            .returning(["id"])
            .compile(&DIALECT)
            .expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"insert into "users" ("name") values (?) returning "id""#
        );
        assert!(statement.returning);
    }

    #[test]
    fn upsert() {
        let insert = QueryBuilder::table("users").insert(record! {
            "email" => "a@b.c",
            "name" => "A",
        });
        assert_eq!(
            sql(&insert.clone().on_conflict(["email"]).ignore()),
            r#"insert into "users" ("email", "name") values (?, ?) on conflict ("email") do nothing"#
        );
        assert_eq!(
            sql(&insert
                .clone()
                .on_conflict(["email"])
                .merge()
                .where_("users.active", true)),
            indoc! {r#"
                insert into "users" ("email", "name") values (?, ?)
                on conflict ("email") do update set "email" = excluded."email", "name" = excluded."name"
                where "users"."active" = ?
            "#}
            .trim()
            .replace('\n', " ")
        );
        let statement = insert
            .on_conflict(["email"])
            .merge_with(record! { "name" => "B" })
            .compile(&DIALECT)
            .expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"insert into "users" ("email", "name") values (?, ?) on conflict ("email") do update set "name" = ?"#
        );
        assert_eq!(statement.bindings.len(), 3);
    }

    #[test]
    fn update_merges_values() {
        let query = QueryBuilder::table("users")
            .update(record! { "a" => 1 })
            .update(record! { "b" => 2, "a" => 10 })
            .increment("views", 1)
            .where_("id", 3);
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"update "users" set "a" = ?, "b" = ?, "views" = "views" + ? where "id" = ?"#
        );
        assert_eq!(
            statement.bindings,
            [Value::Int(10), Value::Int(2), Value::Int(1), Value::Int(3)]
        );
        assert_eq!(
            sql(&QueryBuilder::table("posts").decrement("stock", 2)),
            r#"update "posts" set "stock" = "stock" - ?"#
        );
    }

    #[test]
    fn delete_and_truncate() {
        let statement = QueryBuilder::table("users")
            .where_("id", 1)
            .del()
            .compile(&DIALECT)
            .expect("Could not compile the query");
        assert_eq!(statement.sql, r#"delete from "users" where "id" = ?"#);
        assert_eq!(statement.method, Method::Delete);
        assert_eq!(
            sql(&QueryBuilder::table("users").truncate()),
            r#"truncate "users""#
        );
    }

    #[test]
    fn locks() {
        assert_eq!(
            sql(&QueryBuilder::table("users").where_("id", 1).for_update()),
            r#"select * from "users" where "id" = ? for update"#
        );
        assert_eq!(
            sql(&QueryBuilder::table("users").for_share()),
            r#"select * from "users" for share"#
        );
    }

    #[test]
    fn binding_count_matches_placeholders() {
        let queries = [
            QueryBuilder::table("t")
                .where_("a", 1)
                .where_raw(Raw::new("b \\? ?").bind(2))
                .limit(3),
            QueryBuilder::table("t").insert_many([record! { "a" => 1 }, record! { "b" => 2 }]),
            QueryBuilder::table("t")
                .update(record! { "a" => "x" })
                .where_in("id", [1, 2, 3]),
            QueryBuilder::table("t")
                .with("w", Raw::new("select ?").bind(1))
                .where_between("c", (1, 2))
                .offset(4),
        ];
        for query in queries {
            let statement = query.compile(&DIALECT).expect("Could not compile the query");
            assert_eq!(
                count_placeholders(&statement.sql),
                statement.bindings.len(),
                "{}",
                statement.sql
            );
        }
    }

    #[test]
    fn compile_is_repeatable() {
        let query = QueryBuilder::table("users")
            .select(["id"])
            .where_("name", "x")
            .or()
            .where_in("id", [1, 2])
            .order_by("id", Order::Asc);
        let first = query.compile(&DIALECT).expect("Could not compile the query");
        let second = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(first, second);
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.bindings, second.bindings);
    }

    #[test]
    fn undefined_binding() {
        let error = QueryBuilder::table("users")
            .where_("id", Value::Default)
            .compile(&DIALECT)
            .expect_err("An undefined value must not compile");
        let Some(CompileError::UndefinedBinding { method, columns, .. }) =
            error.downcast_ref::<CompileError>()
        else {
            panic!("Unexpected error: {:#}", error);
        };
        assert_eq!(*method, "select");
        assert_eq!(columns, "id");
    }

    #[test]
    fn invalid_operator() {
        let error = Operator::from_str("<=>").expect_err("Unknown operator");
        assert_eq!(error.to_string(), "The operator \"<=>\" is not permitted");
        assert_eq!(Operator::from_str("!=").ok(), Some(Operator::NotEqual));
        assert_eq!(Operator::from_str("ILIKE").ok(), Some(Operator::ILike));
    }

    #[test]
    fn missing_table_and_empty_payloads() {
        let error = QueryBuilder::new()
            .insert(record! { "a" => 1 })
            .compile(&DIALECT)
            .expect_err("Insert without a table");
        assert!(matches!(
            error.downcast_ref::<CompileError>(),
            Some(CompileError::MissingTable("insert"))
        ));
        let error = QueryBuilder::table("t")
            .insert_many([])
            .compile(&DIALECT)
            .expect_err("Insert without records");
        assert!(matches!(
            error.downcast_ref::<CompileError>(),
            Some(CompileError::Empty("insert"))
        ));
    }

    #[test]
    fn timeouts() {
        let query = QueryBuilder::table("users").timeout(Duration::from_millis(50), true);
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(statement.timeout, Some(Duration::from_millis(50)));
        assert!(statement.cancel_on_timeout);

        let config = Config::new().default_timeout(Duration::from_secs(2));
        let statement = QueryBuilder::table("users")
            .compile_with(&DIALECT, &config)
            .expect("Could not compile the query");
        assert_eq!(statement.timeout, Some(Duration::from_secs(2)));
        assert!(!statement.cancel_on_timeout);
    }

    #[test]
    fn display_query() {
        assert_eq!(
            QueryBuilder::table("users")
                .where_("name", "O'Brien")
                .to_query(&DIALECT)
                .expect("Could not compile the query"),
            r#"select * from "users" where "name" = 'O''Brien'"#
        );
    }

    #[test]
    fn clear_grouping() {
        let query = QueryBuilder::table("users")
            .distinct(["id"])
            .where_("id", 1)
            .clear(quill_core::Grouping::Columns);
        assert_eq!(sql(&query), r#"select * from "users" where "id" = ?"#);
    }

    #[test]
    fn column_info() {
        let statement = QueryBuilder::table("users")
            .column_info(None)
            .compile(&DIALECT)
            .expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            "select * from information_schema.columns where table_name = ?"
        );
        assert_eq!(statement.bindings, [Value::Text("users".into())]);
        assert_eq!(statement.method, Method::ColumnInfo);
        assert!(statement.output.is_some());
    }

    #[test]
    fn aliased_tables_and_subqueries() {
        assert_eq!(
            sql(&QueryBuilder::table("users as u").select(["u.id"])),
            r#"select "u"."id" from "users" as "u""#
        );

        let active = QueryBuilder::table("users")
            .select(["id"])
            .where_("active", true)
            .as_("a");
        let query = QueryBuilder::table(active.clone())
            .join(
                QueryBuilder::table("orders").select(["user_id"]).as_("o"),
                "a.id",
                Operator::Equal,
                "o.user_id",
            )
            .where_("a.id", 2);
        let statement = query.compile(&DIALECT).expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                select * from (select "id" from "users" where "active" = ?) as "a"
                inner join (select "user_id" from "orders") as "o" on "a"."id" = "o"."user_id"
                where "a"."id" = ?
            "#}
            .trim()
            .replace('\n', " ")
        );
        assert_eq!(statement.bindings, [Value::Boolean(true), Value::Int(2)]);

        assert_eq!(
            sql(&active),
            r#"select "id" from "users" as "a" where "active" = ?"#
        );
        assert_eq!(
            sql(&QueryBuilder::table("users").as_("u").select(["u.id"])),
            r#"select "u"."id" from "users" as "u""#
        );
        assert_eq!(
            sql(&QueryBuilder::table("orders").where_in_query(
                "user_id",
                QueryBuilder::table("users").as_("u").select(["u.id"])
            )),
            r#"select * from "orders" where "user_id" in (select "u"."id" from "users" as "u")"#
        );
    }
}
