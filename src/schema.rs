table! {
    comments (id) {
        id -> Integer,
        post_id -> Integer,
        author -> Integer,
        content -> Text,
        is_validated -> Bool,
        created_at -> Text,
    }
}

table! {
    posts (id) {
        id -> Integer,
        title -> Text,
        lede -> Text,
        content -> Text,
        author -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

table! {
    sessions (id) {
        id -> Text,
        data -> Text,
        updated_at -> Text,
    }
}

table! {
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Text,
        password -> Text,
        role -> Text,
        created_at -> Text,
    }
}

joinable!(comments -> posts (post_id));
joinable!(posts -> users (author));

allow_tables_to_appear_in_same_query!(comments, posts, sessions, users,);
