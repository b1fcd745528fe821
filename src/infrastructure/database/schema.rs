diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    documents (id) {
        id -> Text,
        source -> Text,
        title -> Nullable<Text>,
        text -> Text,
        metadata -> Jsonb,
        embedding -> Nullable<Vector>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    chats (id) {
        id -> Uuid,
        patient_id -> Uuid,
        summary -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    messages (id) {
        id -> Uuid,
        chat_id -> Uuid,
        role -> Text,
        content -> Text,
        sources -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    doctors (id) {
        id -> Uuid,
        name -> Text,
        specialty -> Text,
        bio -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    doctor_availability (id) {
        id -> Uuid,
        doctor_id -> Uuid,
        weekday -> Int4,
        start_time -> Time,
        end_time -> Time,
        slot_minutes -> Int4,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    appointments (id) {
        id -> Uuid,
        patient_id -> Uuid,
        doctor_id -> Uuid,
        start_ts -> Timestamptz,
        end_ts -> Timestamptz,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(messages -> chats (chat_id));
diesel::joinable!(doctor_availability -> doctors (doctor_id));
diesel::joinable!(appointments -> doctors (doctor_id));

diesel::allow_tables_to_appear_in_same_query!(
    documents,
    chats,
    messages,
    doctors,
    doctor_availability,
    appointments,
);
