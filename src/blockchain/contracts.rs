// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Platform contract interfaces.
//!
//! Only the functions the client calls are declared.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ICourseRegistry {
        struct Course {
            string courseId;
            address teacher;
            uint256 priceYD;
            uint256 totalPurchases;
        }

        function getCourse(string courseId) external view returns (Course memory);
    }
}

sol! {
    #[sol(rpc)]
    interface ICoursePlatform {
        function purchaseCourse(string courseId) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IStudentCertificate {
        function balanceOf(address owner) external view returns (uint256);
        function getCertificatesByStudent(address student) external view returns (uint256[] memory);
        function certificates(uint256 tokenId) external view returns (
            address student,
            string courseId,
            uint256 issuedAt,
            string metadataURI
        );
        function tokenURI(uint256 tokenId) external view returns (string memory);
    }
}

sol! {
    #[sol(rpc)]
    interface ITeacherBadge {
        function balanceOf(address owner) external view returns (uint256);
    }
}
