diesel::table! {
    accounts (id) {
        id -> Text,
        name -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    account_types (id) {
        id -> Text,
        name -> Text,
    }
}

diesel::table! {
    account_envelopes (account_id, account_type_id) {
        account_id -> Text,
        account_type_id -> Text,
        cash -> Double,
    }
}

diesel::table! {
    orders (id) {
        id -> Text,
        account_id -> Text,
        account_type_id -> Text,
        symbol -> Text,
        side -> Text,
        quantity -> Double,
        price -> Double,
        currency -> Text,
        order_date -> Timestamp,
        created_at -> Timestamp,
    }
}

diesel::table! {
    tickers (id) {
        id -> Text,
        symbol -> Text,
        description -> Nullable<Text>,
        exchange -> Nullable<Text>,
        market -> Nullable<Text>,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    portfolio_history (date) {
        date -> Date,
        total_value -> Double,
    }
}

diesel::joinable!(account_envelopes -> accounts (account_id));
diesel::joinable!(account_envelopes -> account_types (account_type_id));
diesel::joinable!(orders -> accounts (account_id));
diesel::joinable!(orders -> account_types (account_type_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    account_types,
    account_envelopes,
    orders,
    tickers,
    portfolio_history,
);
