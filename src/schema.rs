table! {
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Varchar,
        first_name -> Varchar,
        family_name -> Varchar,
        phone_number -> Varchar,
        date_of_birth -> Date,
        street -> Varchar,
        city -> Varchar,
        state -> Varchar,
        zip -> Varchar,
        ssn_encrypted -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    accounts (id) {
        id -> Uuid,
        user_id -> Uuid,
        account_number -> Varchar,
        account_type -> Varchar,
        balance -> Numeric,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    transactions (id) {
        id -> Int8,
        account_id -> Uuid,
        transaction_type -> Varchar,
        amount -> Numeric,
        description -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

table! {
    sessions (id) {
        id -> Uuid,
        token -> Varchar,
        user_id -> Uuid,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

joinable!(accounts -> users (user_id));
joinable!(sessions -> users (user_id));
joinable!(transactions -> accounts (account_id));

allow_tables_to_appear_in_same_query!(
    users,
    accounts,
    transactions,
    sessions,
);
