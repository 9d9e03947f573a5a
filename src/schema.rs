/// diesel table for categories
table! {
    categories (id) {
        id -> Integer,
        name -> VarChar,
        level -> SmallInt,
        #[sql_name = "id_category"]
        parent_id -> Nullable<Integer>,
    }
}

/// diesel table for producers
table! {
    producers (id) {
        id -> Integer,
        name -> VarChar,
    }
}

/// diesel table for goods
table! {
    goods (id) {
        id -> Integer,
        name -> VarChar,
        price -> Double,
        description -> Nullable<VarChar>,
        in_stock -> Bool,
        #[sql_name = "id_category"]
        category_id -> Integer,
        #[sql_name = "id_producer"]
        producer_id -> Integer,
    }
}

joinable!(goods -> categories (category_id));
joinable!(goods -> producers (producer_id));

allow_tables_to_appear_in_same_query!(categories, goods, producers);
